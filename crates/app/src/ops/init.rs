use std::path::PathBuf;

use clap::Args;

use crate::op::ContextError;
use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Directory for log files (optional, logs to stderr only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Keep blobs here instead of inside the state directory
    #[arg(long)]
    pub blobs_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
            blobs_path: self.blobs_path.clone(),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        // open once so the schema is in place
        ctx.service().await?;

        let output = format!(
            "Initialized raziel directory at: {}\n\
             - Database: {}\n\
             - Blobs: {}\n\
             - Config: {}\n\
             - Log level: {}",
            state.raziel_dir.display(),
            state.db_path.display(),
            state.blobs_path.display(),
            state.config_path.display(),
            state.config.log_level,
        );

        Ok(output)
    }
}
