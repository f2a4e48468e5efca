//! Service infrastructure for the Raziel file store.
//!
//! This crate wires the storage core to its production backends:
//! - Database (SQLite with a MetadataProvider implementation)
//! - State (a FileStore over the database and an on-disk blob store)
//! - Logging setup shared by binaries

pub mod config;
pub mod database;
pub mod logging;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use database::{Database, DatabaseSetupError};
pub use state::{State as ServiceState, StateSetupError};
