use clap::Args;

use crate::state::{AppConfig, AppState, DEFAULT_CHUNK_SIZE};

#[derive(Args, Debug, Clone)]
#[command(about = "Initialize the spandrive config directory")]
pub struct Init {
    /// Path to the credential bundle file (may use ~, $VAR)
    #[arg(long)]
    pub master_key_file: Option<String>,

    /// Upload chunk size in bytes (power of two >= 256 KiB)
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            master_key_file: self.master_key_file.clone(),
            chunk_size: self.chunk_size,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let key_file = state
            .config
            .master_key_file
            .as_deref()
            .unwrap_or("(not set)");

        Ok(format!(
            "Initialized spandrive directory at: {}\n\
             - Config: {}\n\
             - Credential bundle: {}\n\
             - Chunk size: {} bytes",
            state.app_dir.display(),
            state.config_path.display(),
            key_file,
            state.config.chunk_size
        ))
    }
}
