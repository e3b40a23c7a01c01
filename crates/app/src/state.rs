use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "spandrive";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default upload chunk size, 8 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;
/// Chunk sizes must be a power of two and at least this big.
pub const MIN_CHUNK_SIZE: u64 = 256 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the credential bundle file; may use shell-style
    /// expansion (~, $VAR)
    #[serde(default)]
    pub master_key_file: Option<String>,
    /// Upload chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            master_key_file: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

pub fn validate_chunk_size(size: u64) -> Result<(), StateError> {
    if size < MIN_CHUNK_SIZE || !size.is_power_of_two() {
        return Err(StateError::InvalidChunkSize(size));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the spandrive directory (~/.spandrive)
    pub app_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the spandrive directory path (custom or default ~/.spandrive)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }
        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new spandrive state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if app_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&app_dir)?;

        let config = config.unwrap_or_default();
        validate_chunk_size(config.chunk_size)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the spandrive directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if !app_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = app_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Persist the current configuration
    pub fn save(&self) -> Result<(), StateError> {
        validate_chunk_size(self.config.chunk_size)?;
        fs::write(&self.config_path, toml::to_string_pretty(&self.config)?)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("spandrive directory not initialized. Run 'spand init' first")]
    NotInitialized,

    #[error("spandrive directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid chunk size {0}: must be a power of two >= 256 KiB")]
    InvalidChunkSize(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
