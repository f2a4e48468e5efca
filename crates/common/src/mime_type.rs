use mime_guess::mime::{self, Mime};

use crate::error::{Result, StoreError};
use crate::path::FilePath;

/// Pick the media type for an upload.
///
/// An explicit type from the uploader wins. Otherwise the type is guessed
/// from the display name, then from the path. Unknown extensions fall back
/// to `application/octet-stream`.
pub fn resolve_mime_type(
    explicit: Option<&str>,
    display_name: Option<&str>,
    path: &FilePath,
) -> Result<String> {
    if let Some(explicit) = explicit {
        let mime: Mime = explicit
            .trim()
            .parse()
            .map_err(|_| StoreError::InvalidInput(format!("invalid mime type: {explicit}")))?;
        return Ok(mime.to_string());
    }

    let guessed = display_name
        .and_then(|name| mime_guess::from_path(name).first())
        .or_else(|| mime_guess::from_path(path.name()).first())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
    Ok(guessed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> FilePath {
        FilePath::parse(p).unwrap()
    }

    #[test]
    fn test_explicit_wins() {
        let mime = resolve_mime_type(Some("text/plain"), Some("a.png"), &path("/a.zip")).unwrap();
        assert_eq!(mime, "text/plain");
    }

    #[test]
    fn test_explicit_must_parse() {
        assert!(matches!(
            resolve_mime_type(Some("not a mime"), None, &path("/a")),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_guess_order() {
        assert_eq!(
            resolve_mime_type(None, Some("photo.png"), &path("/a.zip")).unwrap(),
            "image/png"
        );
        assert_eq!(
            resolve_mime_type(None, Some("noext"), &path("/a/notes.txt")).unwrap(),
            "text/plain"
        );
        assert_eq!(
            resolve_mime_type(None, None, &path("/a/blob")).unwrap(),
            "application/octet-stream"
        );
    }
}
