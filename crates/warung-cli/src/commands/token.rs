use warung_core::vault::{BearerToken, StoredCredential};

use crate::cli::TokenCommands;
use crate::commands::common::{load_profile, read_input_document};
use crate::credentials::{resolve_passphrase, vault_for_profile};
use crate::error::CliError;

pub fn run_token(
    command: TokenCommands,
    global_profile: Option<&str>,
    passphrase: Option<&str>,
) -> Result<(), CliError> {
    let (profile_name, _) = load_profile(global_profile)?;
    let vault = vault_for_profile(&profile_name);

    match command {
        TokenCommands::Set { token, encrypt } => {
            let raw = match token {
                Some(token) => token,
                None => read_input_document(None)?,
            };
            let token = BearerToken::new(raw)?;
            if encrypt {
                let passphrase = resolve_passphrase(passphrase).ok_or_else(|| {
                    CliError::InvalidInput(
                        "--encrypt needs --passphrase or WARUNG_PASSPHRASE".to_string(),
                    )
                })?;
                vault.seal(&token, &passphrase)?;
                println!("Stored encrypted token for profile '{profile_name}'");
            } else {
                vault.store_plain(&token)?;
                println!("Stored token for profile '{profile_name}'");
            }
            Ok(())
        }
        TokenCommands::Status => {
            let label = match vault.load()? {
                None => "no token stored",
                Some(StoredCredential::Plain(_)) => "plaintext token stored",
                Some(StoredCredential::Encrypted(_)) => "encrypted token stored",
            };
            println!("Profile '{profile_name}': {label}");
            if std::env::var_os("GITHUB_TOKEN").is_some() {
                println!("GITHUB_TOKEN is set and takes precedence");
            }
            Ok(())
        }
        TokenCommands::Clear => {
            vault.clear()?;
            println!("Cleared token for profile '{profile_name}'");
            Ok(())
        }
    }
}
