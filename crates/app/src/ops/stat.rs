use clap::Args;
use common::prelude::*;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Stored path to describe
    pub path: String,

    #[arg(long)]
    pub version: Option<u64>,

    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode descriptor: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Stat {
    type Error = StatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, service) = ctx.service().await?;
        let query = DescriptorQuery {
            version: self.version,
            tag: self.tag.clone(),
        };
        let descriptor = service.store().stat(&self.path, &query).await?;
        Ok(serde_json::to_string_pretty(&descriptor)?)
    }
}
