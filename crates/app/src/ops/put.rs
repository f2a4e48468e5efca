use std::path::PathBuf;

use clap::Args;
use common::prelude::*;
use object_store::BlobStoreError;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Local file to upload, `-` for stdin
    pub file: PathBuf,

    /// Path to store the file at, e.g. /releases/app.zip
    pub path: String,

    /// Free-form label for this version
    #[arg(long)]
    pub tag: Option<String>,

    /// Display name (defaults to the local file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Media type (guessed from the name when not set)
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Protect a new path; a secret is generated unless --secret is given
    #[arg(long)]
    pub protect: bool,

    /// Secret for a protected path
    #[arg(long)]
    pub secret: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("upload failed: {0}")]
    Upload(#[from] BlobStoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::op::Op for Put {
    type Error = PutError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (_, service) = ctx.service().await?;
        let store = service.store();

        let mut upload = store.begin_upload().await?;
        let from_stdin = self.file.as_os_str() == "-";
        if from_stdin {
            upload.write_from(&mut tokio::io::stdin()).await?;
        } else {
            let mut file = tokio::fs::File::open(&self.file)
                .await
                .map_err(|e| PutError::Read(self.file.clone(), e))?;
            upload.write_from(&mut file).await?;
        }
        let staged = upload.finish().await?;

        let display_name = self.name.clone().or_else(|| {
            (!from_stdin)
                .then(|| self.file.file_name())
                .flatten()
                .map(|n| n.to_string_lossy().into_owned())
        });
        let request = UploadRequest {
            path: self.path.clone(),
            tag: self.tag.clone(),
            display_name,
            mime_type: self.mime_type.clone(),
            protect: self.protect,
            secret: self.secret.clone(),
        };
        let new = store.commit_upload(staged, request).await?;

        let d = &new.descriptor;
        let mut output = format!(
            "Stored {} version {}\n - Hash: {}\n - Size: {} bytes\n - Type: {}",
            d.path, d.version, d.content.hash, d.content.size, d.content.mime_type
        );
        if let Some(secret) = new.secret {
            output.push_str(&format!(
                "\n - Secret: {}\n   Keep it safe, it is required for every further write and is not shown again",
                secret
            ));
        }
        Ok(output)
    }
}
