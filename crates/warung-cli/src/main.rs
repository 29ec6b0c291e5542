//! Warung CLI - Command-line admin for a small storefront's product catalog
//!
//! Edits the local catalog and publishes it, with product images, to a
//! GitHub repository.

mod cli;
mod commands;
mod config_profiles;
mod credentials;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::{resolve_catalog_path, RemoteOptions};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::{run_clear, run_delete};
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::image_url::run_image_url;
use crate::commands::images::run_images;
use crate::commands::import::run_import;
use crate::commands::list::{run_categories, run_list};
use crate::commands::publish::{run_fetch, run_publish};
use crate::commands::push::run_push;
use crate::commands::token::run_token;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "warung=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let options = RemoteOptions {
        profile: cli.profile.as_deref(),
        passphrase: cli.passphrase.as_deref(),
    };
    let catalog_path = || resolve_catalog_path(cli.catalog_path.clone());

    match command {
        Commands::Add {
            name,
            price,
            category,
            img,
        } => {
            run_add(&name, price, &category, &img, &catalog_path()?)?;
        }
        Commands::List {
            category,
            search,
            sort,
            json,
        } => run_list(
            category.as_deref(),
            search.as_deref(),
            sort,
            json,
            &catalog_path()?,
        )?,
        Commands::Categories { json } => run_categories(json, &catalog_path()?)?,
        Commands::Edit { id, field, value } => {
            run_edit(&id, field, &value, &catalog_path()?)?;
        }
        Commands::Delete { id } => run_delete(&id, &catalog_path()?)?,
        Commands::Clear { yes } => {
            run_clear(yes, &catalog_path()?)?;
        }
        Commands::Import { input } => {
            run_import(input.as_deref(), &catalog_path()?)?;
        }
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &catalog_path()?)?;
        }
        Commands::Publish { remote_path } => {
            run_publish(remote_path.as_deref(), options, &catalog_path()?).await?;
        }
        Commands::Fetch { remote_path, yes } => {
            run_fetch(remote_path.as_deref(), yes, options, &catalog_path()?).await?;
        }
        Commands::Images { command } => run_images(command, options).await?,
        Commands::Token { command } => run_token(command, options.profile, options.passphrase)?,
        Commands::Config { command } => run_config(command, options.profile)?,
        Commands::ImageUrl { id } => {
            run_image_url(&id, &catalog_path()?)?;
        }
        Commands::Push { endpoint } => {
            run_push(endpoint, options.profile, &catalog_path()?).await?;
        }
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
