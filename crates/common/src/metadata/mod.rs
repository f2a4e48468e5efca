mod memory;
mod provider;

pub use memory::{MemoryMetadataProvider, MemoryMetadataProviderError};
pub use provider::{MetadataError, MetadataProvider};
