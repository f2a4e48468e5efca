use clap::Args;
use common::prelude::*;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Directory to list
    #[arg(default_value = "/")]
    pub namespace: String,

    /// Entries per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, service) = ctx.service().await?;
        let limit = self.limit.unwrap_or(state.config.page_size);
        let nodes = service
            .store()
            .list_children(&self.namespace, limit, self.offset)
            .await?;

        let lines: Vec<String> = nodes
            .iter()
            .map(|node| match node.kind {
                NodeKind::Interior => format!("{}/", node.name),
                NodeKind::Leaf => node.name.clone(),
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
