use clap::Args;
use common::prelude::*;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct History {
    /// Stored path whose versions to list
    pub path: String,

    /// Versions per page (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::op::Op for History {
    type Error = HistoryError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (state, service) = ctx.service().await?;
        let limit = self.limit.unwrap_or(state.config.page_size);
        let versions = service
            .store()
            .read_history(&self.path, limit, self.offset)
            .await?;

        if versions.is_empty() {
            return Ok(format!("No versions of {}", self.path));
        }

        let lines: Vec<String> = versions
            .iter()
            .map(|d| {
                format!(
                    "v{:<4} {}  {:>10}  {}  downloads={}{}",
                    d.version,
                    d.created_at.format("%Y-%m-%d %H:%M:%S"),
                    d.content.size,
                    d.content.hash,
                    d.downloads,
                    d.tag
                        .as_deref()
                        .map(|t| format!("  tag={t}"))
                        .unwrap_or_default()
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
