use clap::Args;
use common::prelude::*;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Link {
    /// Existing path whose content the link points at
    pub target: String,

    /// Path of the link
    pub link: String,

    /// Link to this version of the target instead of the newest
    #[arg(long)]
    pub version: Option<u64>,

    /// Protect a new link path; a secret is generated unless --secret is given
    #[arg(long)]
    pub protect: bool,

    /// Secret for a protected link path
    #[arg(long)]
    pub secret: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::op::Op for Link {
    type Error = LinkError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, service) = ctx.service().await?;
        let request = LinkRequest {
            link_path: self.link.clone(),
            target_path: self.target.clone(),
            target_version: self.version,
            protect: self.protect,
            secret: self.secret.clone(),
        };
        let new = service.store().create_link(request).await?;

        let d = &new.descriptor;
        let mut output = format!(
            "Linked {} version {} -> {}",
            d.path, d.version, d.content.hash
        );
        if let Some(secret) = new.secret {
            output.push_str(&format!("\n - Secret: {}", secret));
        }
        Ok(output)
    }
}
