//! Inspect and update the drive config parameters

use std::fmt;

use clap::{Args, Subcommand};

use crate::state::{validate_chunk_size, AppState};

#[derive(Args, Debug, Clone)]
#[command(about = "Inspect or update config parameters")]
pub struct Config {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the current config parameters
    Get,
    /// Update config parameters
    Set {
        /// Update the upload chunk size (power of two >= 256 KiB)
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Update the credential bundle path
        #[arg(long)]
        master_key_file: Option<String>,
    },
}

#[derive(Debug)]
pub struct ConfigOutput {
    master_key_file: Option<String>,
    chunk_size: u64,
}

impl fmt::Display for ConfigOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "master_key_file: {}",
            self.master_key_file.as_deref().unwrap_or("(not set)")
        )?;
        write!(f, "chunk_size: {}", self.chunk_size)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Config {
    type Error = ConfigError;
    type Output = ConfigOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut state = AppState::load(ctx.config_path.clone())?;

        if let ConfigCommand::Set {
            chunk_size,
            master_key_file,
        } = &self.command
        {
            if let Some(size) = chunk_size {
                validate_chunk_size(*size)?;
                state.config.chunk_size = *size;
            }
            if let Some(path) = master_key_file {
                state.config.master_key_file = Some(path.clone());
            }
            state.save()?;
        }

        Ok(ConfigOutput {
            master_key_file: state.config.master_key_file,
            chunk_size: state.config.chunk_size,
        })
    }
}
