//! List the accounts in the credential bundle

use std::fmt;

use clap::Args;
use serde::Serialize;

use common::bundle::{BundleError, CredentialBundle};

use crate::state::AppState;

#[derive(Args, Debug, Clone)]
#[command(about = "List the accounts in the credential bundle")]
pub struct Accounts {
    /// Path to the credential bundle (defaults to the configured
    /// master_key_file)
    #[arg(long)]
    pub key_file: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AccountRow {
    name: String,
    client_email: String,
    role: &'static str,
}

#[derive(Debug)]
pub struct AccountsOutput {
    rows: Vec<AccountRow>,
    json: bool,
}

impl fmt::Display for AccountsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.json {
            writeln!(
                f,
                "{}",
                serde_json::to_string_pretty(&self.rows).unwrap_or_default()
            )
        } else {
            writeln!(f, "{:<20}  {:<40}  {:<8}", "NAME", "EMAIL", "ROLE")?;
            writeln!(f, "{}", "-".repeat(72))?;
            for row in &self.rows {
                writeln!(
                    f,
                    "{:<20}  {:<40}  {:<8}",
                    row.name, row.client_email, row.role
                )?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    #[error("no credential bundle configured; pass --key-file or set master_key_file")]
    NoBundle,
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
}

#[async_trait::async_trait]
impl crate::op::Op for Accounts {
    type Error = AccountsError;
    type Output = AccountsOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let key_file = match &self.key_file {
            Some(path) => path.clone(),
            None => AppState::load(ctx.config_path.clone())?
                .config
                .master_key_file
                .ok_or(AccountsError::NoBundle)?,
        };

        let (index, storage) = CredentialBundle::load(&key_file)?.partition()?;

        let mut rows = vec![AccountRow {
            name: index.name().to_string(),
            client_email: index.client_email().to_string(),
            role: "index",
        }];
        for identity in &storage {
            rows.push(AccountRow {
                name: identity.name().to_string(),
                client_email: identity.client_email().to_string(),
                role: "storage",
            });
        }

        Ok(AccountsOutput {
            rows,
            json: self.json,
        })
    }
}
