//! Content fingerprints
//!
//! A BLAKE3 digest over the original bytes, taken before any parsing. Two
//! files with equal fingerprints are identical and need no comparison.

use crate::error::{NetcfgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Lowercase hex BLAKE3 digest of a file's bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines and tables
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint(blake3::hash(data).to_hex().to_string())
}

/// Fingerprint a file on disk
///
/// Fails with `IdentityUnavailable` when the file cannot be read.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
    let data = std::fs::read(path).map_err(|e| NetcfgError::IdentityUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(fingerprint_bytes(&data))
}

/// True when both fingerprints name the same content
pub fn compare_identity(a: &Fingerprint, b: &Fingerprint) -> bool {
    a == b
}
