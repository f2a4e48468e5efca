//! Per-path write protection.
//!
//! A protected path stores only the SHA-256 digest of its secret. Writers
//! present the plaintext secret, which is digested and compared in constant
//! time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{Result, StoreError};

/// Bytes of entropy in a generated secret
const SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid protection digest: {0}")]
pub struct InvalidDigest(String);

/// Hex encoded SHA-256 digest of a path secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtectionDigest([u8; 32]);

impl ProtectionDigest {
    pub fn of(secret: &str) -> Self {
        Self(Sha256::digest(secret.as_bytes()).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check a presented secret against this digest.
    pub fn matches(&self, secret: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        self.0[..].ct_eq(&candidate[..]).into()
    }
}

impl fmt::Debug for ProtectionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectionDigest({}..)", &self.to_hex()[..8])
    }
}

impl FromStr for ProtectionDigest {
    type Err = InvalidDigest;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| InvalidDigest(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| InvalidDigest(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ProtectionDigest {
    type Error = InvalidDigest;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProtectionDigest> for String {
    fn from(value: ProtectionDigest) -> Self {
        value.to_hex()
    }
}

/// Protection requested by a writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Protection<'a> {
    /// Ask for a new path to be protected
    pub protect: bool,
    /// Secret presented by the writer
    pub secret: Option<&'a str>,
}

impl<'a> Protection<'a> {
    pub fn new(protect: bool, secret: Option<&'a str>) -> Self {
        Self { protect, secret }
    }

    /// Anonymous write without any secret.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Generate a fresh secret for a newly protected path.
pub fn generate_secret() -> Result<String> {
    let mut bytes = [0u8; SECRET_BYTES];
    getrandom::getrandom(&mut bytes).map_err(StoreError::Entropy)?;
    Ok(hex::encode(bytes))
}

/// Decide whether a write to a path guarded by `protection` may proceed.
///
/// Unprotected paths accept every writer, with or without a secret.
pub fn authorize(protection: Option<&ProtectionDigest>, secret: Option<&str>) -> Result<()> {
    let Some(digest) = protection else {
        return Ok(());
    };
    match secret {
        Some(secret) if digest.matches(secret) => Ok(()),
        Some(_) => Err(StoreError::Unauthorized("secret does not match".into())),
        None => Err(StoreError::Unauthorized("path is protected".into())),
    }
}
