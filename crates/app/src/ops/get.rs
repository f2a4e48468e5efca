use std::path::PathBuf;

use clap::Args;
use common::prelude::*;
use tokio::io::AsyncWriteExt;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Stored path to fetch
    pub path: String,

    /// Fetch this version instead of the newest
    #[arg(long)]
    pub version: Option<u64>,

    /// Fetch the newest version carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Where to write the content (defaults to the path's file name, `-` for stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Get {
    type Error = GetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, service) = ctx.service().await?;
        let query = DescriptorQuery {
            version: self.version,
            tag: self.tag.clone(),
        };
        let mut download = service.store().read_latest(&self.path, &query).await?;
        let d = &download.descriptor;

        let target = match &self.output {
            Some(output) => output.clone(),
            None => PathBuf::from(d.path.name()),
        };

        if target.as_os_str() == "-" {
            let mut stdout = tokio::io::stdout();
            tokio::io::copy(&mut download.reader, &mut stdout)
                .await
                .map_err(|e| GetError::Write(target.clone(), e))?;
            stdout
                .flush()
                .await
                .map_err(|e| GetError::Write(target, e))?;
            // nothing else may reach stdout
            return Ok(String::new());
        }

        let mut file = tokio::fs::File::create(&target)
            .await
            .map_err(|e| GetError::Write(target.clone(), e))?;
        let written = tokio::io::copy(&mut download.reader, &mut file)
            .await
            .map_err(|e| GetError::Write(target.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| GetError::Write(target.clone(), e))?;

        Ok(format!(
            "Wrote {} version {} to {} ({} bytes)",
            d.path,
            d.version,
            target.display(),
            written
        ))
    }
}
