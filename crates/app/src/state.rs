use std::{fs, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "raziel";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const BLOBS_DIR_NAME: &str = "blobs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for log files (optional, logs to stderr only if not set)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Where blobs are kept (defaults to <raziel dir>/blobs)
    #[serde(default)]
    pub blobs_path: Option<PathBuf>,
    /// Page size for history and listings when none is given
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_page_size() -> u32 {
    50
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: None,
            blobs_path: None,
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the raziel directory (~/.raziel)
    pub raziel_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the blobs directory
    pub blobs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the raziel directory path (custom or default ~/.raziel)
    pub fn raziel_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new raziel state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let raziel_dir = Self::raziel_dir(custom_path)?;

        if raziel_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&raziel_dir)?;

        let config = config.unwrap_or_default();
        config.log_level()?;

        let blobs_path = config
            .blobs_path
            .clone()
            .unwrap_or_else(|| raziel_dir.join(BLOBS_DIR_NAME));
        fs::create_dir_all(&blobs_path)?;

        let config_path = raziel_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Create empty database (just touch the file, it is migrated on first open)
        let db_path = raziel_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            raziel_dir,
            db_path,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the raziel directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let raziel_dir = Self::raziel_dir(custom_path)?;

        if !raziel_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = raziel_dir.join(DB_FILE_NAME);
        let config_path = raziel_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        let blobs_path = config
            .blobs_path
            .clone()
            .unwrap_or_else(|| raziel_dir.join(BLOBS_DIR_NAME));

        Ok(Self {
            raziel_dir,
            db_path,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Service configuration for this state directory
    pub fn service_config(&self) -> Result<service::Config, StateError> {
        Ok(service::Config {
            blobs_path: self.blobs_path.clone(),
            sqlite_path: Some(self.db_path.clone()),
            log_level: self.config.log_level()?,
            log_dir: self.config.log_dir.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("raziel directory not initialized. Run 'raziel init' first")]
    NotInitialized,

    #[error("raziel directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
