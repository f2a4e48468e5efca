use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // storage configuration
    /// directory holding the content-addressed blobs,
    ///  created if missing
    pub blobs_path: PathBuf,
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stderr only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(blobs_path: impl Into<PathBuf>) -> Self {
        Self {
            blobs_path: blobs_path.into(),
            sqlite_path: None,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
