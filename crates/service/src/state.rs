use url::Url;

use common::file_store::FileStore;
use object_store::{BlobStore, BlobStoreError};

use super::config::Config;
use super::database::{Database, DatabaseSetupError};

/// Main service state - a file store over the sqlite database
#[derive(Clone, Debug)]
pub struct State {
    store: FileStore<Database>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // the file itself is created on first connect
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        return Err(StateSetupError::DatabasePathDoesNotExist);
                    }
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup blob store
        tracing::debug!("State::from_config - opening blob store");
        let blobs = BlobStore::open_or_create(&config.blobs_path).await?;
        tracing::info!("Blob store at {}", blobs.root().display());

        Ok(Self {
            store: FileStore::new(blobs, database),
        })
    }

    pub fn store(&self) -> &FileStore<Database> {
        &self.store
    }
}

impl AsRef<FileStore<Database>> for State {
    fn as_ref(&self) -> &FileStore<Database> {
        &self.store
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database directory does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Blob store error: {0}")]
    BlobStoreError(#[from] BlobStoreError),
}
