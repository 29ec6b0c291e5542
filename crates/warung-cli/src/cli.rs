use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "warung")]
#[command(about = "Manage a small storefront's product catalog from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to the local catalog file
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog_path: Option<PathBuf>,

    /// CLI profile name for remote repository configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Passphrase for an encrypted stored token (falls back to WARUNG_PASSPHRASE)
    #[arg(long, global = true, value_name = "PASSPHRASE")]
    pub passphrase: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a product, or update the product with the same name, price, category and image
    #[command(alias = "new")]
    Add {
        /// Product name
        #[arg(long)]
        name: String,
        /// Price; must be greater than zero
        #[arg(long)]
        price: f64,
        /// Category label
        #[arg(long)]
        category: String,
        /// Image file name or `dir/file` path
        #[arg(long)]
        img: String,
    },
    /// List products
    List {
        /// Keep only this exact category
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order
        #[arg(long, value_enum, default_value_t = SortArg::None)]
        sort: SortArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List distinct categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a single field of a product
    Edit {
        /// Product ID or unique ID prefix
        id: String,
        /// Field to change
        #[arg(value_enum)]
        field: FieldArg,
        /// New value
        value: String,
    },
    /// Delete a product
    Delete {
        /// Product ID or unique ID prefix
        id: String,
    },
    /// Remove every product from the local catalog
    Clear {
        /// Confirm the irreversible clear
        #[arg(long)]
        yes: bool,
    },
    /// Import a JSON array of products (stdin when no file is given)
    Import {
        /// Input file, or `-` for stdin
        #[arg(value_name = "PATH")]
        input: Option<PathBuf>,
    },
    /// Export the catalog
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormatArg::Json)]
        format: ExportFormatArg,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Publish the catalog to the remote repository
    Publish {
        /// Override the remote catalog path
        #[arg(long, value_name = "PATH")]
        remote_path: Option<String>,
    },
    /// Replace the local catalog with the remote copy
    Fetch {
        /// Override the remote catalog path
        #[arg(long, value_name = "PATH")]
        remote_path: Option<String>,
        /// Confirm overwriting the local catalog
        #[arg(long)]
        yes: bool,
    },
    /// Manage product images in the remote repository
    Images {
        #[command(subcommand)]
        command: ImagesCommands,
    },
    /// Manage the stored GitHub token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print an image search URL for a product
    ImageUrl {
        /// Product ID or unique ID prefix
        id: String,
    },
    /// Append the published catalog to a server merge endpoint
    Push {
        /// Merge endpoint URL (defaults to the profile's merge_endpoint)
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortArg {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    None,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FieldArg {
    Name,
    Price,
    Category,
    #[value(alias = "image")]
    Img,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Subcommand)]
pub enum ImagesCommands {
    /// Upload image files one at a time
    Upload {
        /// Local image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Remote directory (defaults to the profile's images_dir)
        #[arg(long, value_name = "DIR")]
        dir: Option<String>,
        /// Replace files that already exist remotely
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete remote files one at a time
    Delete {
        /// Remote paths, or bare names inside the images directory
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List a remote directory
    List {
        /// Remote directory (defaults to the profile's images_dir)
        dir: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Store a token (read from stdin when omitted)
    Set {
        /// GitHub token
        token: Option<String>,
        /// Encrypt the token with --passphrase / WARUNG_PASSPHRASE
        #[arg(long)]
        encrypt: bool,
    },
    /// Show how the token is stored
    Status,
    /// Erase the stored token
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Repository owner
        #[arg(long)]
        owner: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
        /// Branch to read and write
        #[arg(long)]
        branch: Option<String>,
        /// Repository path of the published catalog
        #[arg(long, value_name = "PATH")]
        remote_catalog_path: Option<String>,
        /// Repository directory for images
        #[arg(long, value_name = "DIR")]
        images_dir: Option<String>,
        /// GitHub API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Server merge endpoint URL
        #[arg(long, value_name = "URL")]
        merge_endpoint: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
