use serde::Serialize;
use warung_core::config::{
    DEFAULT_API_BASE_URL, DEFAULT_BRANCH, DEFAULT_CATALOG_PATH, DEFAULT_IMAGES_DIR,
};

use crate::cli::ConfigCommands;
use crate::config_profiles::{normalize_text_option, CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Values supplied to `config init`; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub catalog_path: Option<String>,
    pub images_dir: Option<String>,
    pub api_base_url: Option<String>,
    pub merge_endpoint: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut CliProfile) {
        let assign = |target: &mut Option<String>, value: Option<String>| {
            if let Some(value) = normalize_text_option(value) {
                *target = Some(value);
            }
        };
        assign(&mut profile.github_owner, self.owner);
        assign(&mut profile.github_repo, self.repo);
        assign(&mut profile.github_branch, self.branch);
        assign(&mut profile.catalog_path, self.catalog_path);
        assign(&mut profile.images_dir, self.images_dir);
        assign(&mut profile.api_base_url, self.api_base_url);
        assign(&mut profile.merge_endpoint, self.merge_endpoint);
    }
}

#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    name: &'a str,
    active: bool,
    #[serde(flatten)]
    profile: &'a CliProfile,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            owner,
            repo,
            branch,
            remote_catalog_path,
            images_dir,
            api_base_url,
            merge_endpoint,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let update = ProfileUpdate {
                owner,
                repo,
                branch,
                catalog_path: remote_catalog_path,
                images_dir,
                api_base_url,
                merge_endpoint,
            };
            let profile_name = init_profile(
                &mut config,
                profile.as_deref().or(global_profile),
                update,
                no_activate,
            )?;
            let path = config.save().map_err(CliError::Config)?;
            println!("Profile '{profile_name}' saved to {}", path.display());

            let missing = config
                .profile(&profile_name)
                .map(CliProfile::missing_fields)
                .unwrap_or_default();
            if missing.is_empty() {
                println!(
                    "Profile '{profile_name}' is ready. Store a token with `warung token set`."
                );
            } else {
                println!("Profile '{profile_name}' is missing: {}", missing.join(", "));
            }
            Ok(())
        }
        ConfigCommands::Show { json } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let Some(profile) = config.profile(&profile_name) else {
                println!("Profile '{profile_name}' is not configured.");
                return Ok(());
            };
            let view = ProfileView {
                name: &profile_name,
                active: config.active_profile.as_deref() == Some(profile_name.as_str()),
                profile,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                for line in format_profile_lines(&view) {
                    println!("{line}");
                }
            }
            Ok(())
        }
    }
}

/// Merge `update` into the resolved profile and validate it.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    explicit_profile: Option<&str>,
    update: ProfileUpdate,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(explicit_profile);
    let profile = config.profile_mut_or_default(&profile_name);
    update.apply(profile);
    profile.validate().map_err(CliError::Config)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

fn format_profile_lines(view: &ProfileView<'_>) -> Vec<String> {
    let field = |label: &str, value: Option<&str>, default: &str| {
        format!("{label:<15} {}", value.unwrap_or(default))
    };
    let profile = view.profile;
    let active = if view.active { " (active)" } else { "" };
    vec![
        format!("{:<15} {}{active}", "profile", view.name),
        field("owner", profile.github_owner.as_deref(), "-"),
        field("repo", profile.github_repo.as_deref(), "-"),
        field("branch", profile.github_branch.as_deref(), DEFAULT_BRANCH),
        field(
            "catalog_path",
            profile.catalog_path.as_deref(),
            DEFAULT_CATALOG_PATH,
        ),
        field("images_dir", profile.images_dir.as_deref(), DEFAULT_IMAGES_DIR),
        field(
            "api_base_url",
            profile.api_base_url.as_deref(),
            DEFAULT_API_BASE_URL,
        ),
        field("merge_endpoint", profile.merge_endpoint.as_deref(), "-"),
    ]
}
