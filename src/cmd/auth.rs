// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `auth` command: checks a token against the identity endpoint.

use tracing::info;

use crate::cli::deploy::{AuthArgs, TokenArgs};
use crate::config::Config;
use crate::error::{DeployError, DeployResult, Result};
use crate::github::{Credential, CredentialStatus, GitHubClient};

/// Credential from `--token` / `GITHUB_TOKEN`.
///
/// # Errors
///
/// Returns `DeployError::InvalidCredential` when no token was given.
pub fn resolve_credential(args: &TokenArgs) -> DeployResult<Credential> {
    let credential = Credential::new(args.token.clone().unwrap_or_default());
    if credential.is_empty() {
        return Err(DeployError::InvalidCredential(
            "no token given; pass --token or set GITHUB_TOKEN".to_string(),
        ));
    }
    Ok(credential)
}

/// Validates `credential`, failing fast on rejection.
///
/// # Errors
///
/// Returns `DeployError::InvalidCredential` if the token is rejected.
pub async fn require_valid(
    client: &GitHubClient,
    credential: &Credential,
) -> DeployResult<CredentialStatus> {
    let status = client.validate_credential(credential).await;
    if !status.valid {
        return Err(DeployError::InvalidCredential(
            "GitHub rejected the token".to_string(),
        ));
    }
    info!(login = status.identity_name.as_deref().unwrap_or("?"), "token accepted");
    Ok(status)
}

/// Run the auth command.
///
/// # Errors
///
/// Returns an error if no token is given or it is rejected.
pub async fn run_auth_command(args: &AuthArgs, config: &Config) -> Result<()> {
    let credential = resolve_credential(&args.token)?;
    let client = GitHubClient::new(&config.github)?;
    let status = client.validate_credential(&credential).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if let Some(login) = status.identity_name.as_deref() {
        println!("Authenticated as {login}");
    }

    if status.valid {
        Ok(())
    } else {
        Err(DeployError::InvalidCredential("GitHub rejected the token".to_string()).into())
    }
}
