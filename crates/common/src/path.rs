//! Normalized logical paths and label cleaning.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of segments a path may have
pub const MAX_SEGMENTS: usize = 255;

/// Characters kept verbatim by [`clean_label`]
const VALID_LABEL_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789,._ &";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("no file path specified")]
    Root,
    #[error("path has {0} segments, at most {MAX_SEGMENTS} are allowed")]
    TooDeep(usize),
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
}

/// An absolute, slash separated path naming a stored file.
///
/// Empty segments are dropped when parsing, so `//a///b/` and `/a/b` are the
/// same path. The root itself never names a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let normalized = normalize(raw)?;
        if normalized == "/" {
            return Err(PathError::Root);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parent directory, `/` for top level paths.
    pub fn namespace(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }

    /// The last segment.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FilePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FilePath> for String {
    fn from(value: FilePath) -> Self {
        value.0
    }
}

/// Normalize a namespace for tree listings. Unlike [`FilePath::parse`] the
/// root is allowed.
pub fn normalize_namespace(raw: &str) -> Result<String, PathError> {
    normalize(raw)
}

fn normalize(raw: &str) -> Result<String, PathError> {
    let mut normalized = String::with_capacity(raw.len() + 1);
    let mut count = 0;

    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\0') {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }
        normalized.push('/');
        normalized.push_str(segment);
        count += 1;
    }

    if count > MAX_SEGMENTS {
        return Err(PathError::TooDeep(count));
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Clean a display name or tag.
///
/// Only letters, digits and `,._ &` are kept. Any run of other characters
/// following a kept one becomes a single `-`. Returns `None` when nothing is
/// left.
pub fn clean_label(label: &str) -> Option<String> {
    let mut result = String::with_capacity(label.len());
    let mut prev = None;

    for c in label.chars() {
        if VALID_LABEL_CHARS.contains(c) {
            prev = Some(c);
            result.push(c);
        } else if prev.is_some() && prev != Some('-') {
            result.push('-');
            prev = Some('-');
        }
    }

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}
