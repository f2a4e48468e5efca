pub mod get;
pub mod history;
pub mod init;
pub mod link;
pub mod ls;
pub mod put;
pub mod stat;
pub mod version;

pub use get::Get;
pub use history::History;
pub use init::Init;
pub use link::Link;
pub use ls::Ls;
pub use put::Put;
pub use stat::Stat;
pub use version::Version;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Op, OpContext};
    use tempfile::TempDir;

    async fn init(temp: &TempDir) -> OpContext {
        let ctx = OpContext::new(Some(temp.path().join("state")));
        let init = Init {
            log_level: "warn".into(),
            log_dir: None,
            blobs_path: None,
        };
        init.execute(&ctx).await.unwrap();
        ctx
    }

    fn put(file: std::path::PathBuf, path: &str) -> Put {
        Put {
            file,
            path: path.into(),
            tag: None,
            name: None,
            mime_type: None,
            protect: false,
            secret: None,
        }
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let temp = TempDir::new().unwrap();
        let ctx = init(&temp).await;

        let local = temp.path().join("notes.txt");
        std::fs::write(&local, b"remember the milk").unwrap();
        let output = put(local, "/lists/notes.txt").execute(&ctx).await.unwrap();
        assert!(output.contains("Stored /lists/notes.txt version 1"));

        let out = temp.path().join("fetched.txt");
        let get = Get {
            path: "/lists/notes.txt".into(),
            version: None,
            tag: None,
            output: Some(out.clone()),
        };
        get.execute(&ctx).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"remember the milk");

        let stat = Stat {
            path: "/lists/notes.txt".into(),
            version: None,
            tag: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&stat.execute(&ctx).await.unwrap()).unwrap();
        assert_eq!(json["downloads"], 1);
        assert_eq!(json["display_name"], "notes.txt");

        let ls = Ls {
            namespace: "/".into(),
            limit: None,
            offset: 0,
        };
        assert_eq!(ls.execute(&ctx).await.unwrap(), "lists/");
    }

    #[tokio::test]
    async fn test_protected_put_requires_secret() {
        let temp = TempDir::new().unwrap();
        let ctx = init(&temp).await;
        let local = temp.path().join("a.bin");
        std::fs::write(&local, b"a").unwrap();

        let first = Put {
            protect: true,
            ..put(local.clone(), "/a.bin")
        };
        let output = first.execute(&ctx).await.unwrap();
        assert!(output.contains("Secret:"));

        let result = put(local, "/a.bin").execute(&ctx).await;
        assert!(matches!(
            result,
            Err(put::PutError::Store(common::error::StoreError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn test_link_and_history() {
        let temp = TempDir::new().unwrap();
        let ctx = init(&temp).await;
        let local = temp.path().join("build.tar");
        std::fs::write(&local, b"tar").unwrap();
        put(local.clone(), "/builds/1.tar").execute(&ctx).await.unwrap();

        let link = Link {
            target: "/builds/1.tar".into(),
            link: "/builds/latest.tar".into(),
            version: None,
            protect: false,
            secret: None,
        };
        link.execute(&ctx).await.unwrap();
        link.execute(&ctx).await.unwrap();

        let history = History {
            path: "/builds/latest.tar".into(),
            limit: None,
            offset: 0,
        };
        let output = history.execute(&ctx).await.unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.starts_with("v2"));
    }

    #[tokio::test]
    async fn test_ops_need_init() {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("missing")));
        let result = Stat {
            path: "/x".into(),
            version: None,
            tag: None,
        }
        .execute(&ctx)
        .await;
        assert!(matches!(result, Err(stat::StatError::Context(_))));
    }
}
