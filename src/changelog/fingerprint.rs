/*!
 * Content fingerprinting and change detection.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a document's exact bytes, kept as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a document
    pub fn of(document: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(document.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Rebuild a fingerprint from its stored hex form.
    ///
    /// Surrounding whitespace is ignored; anything that is not a 64 character
    /// hex string is rejected.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(hex.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `current` differs from the document `stored` was computed from.
/// A missing fingerprint always counts as changed.
pub fn has_changed(current: &str, stored: Option<&Fingerprint>) -> bool {
    match stored {
        Some(stored) => Fingerprint::of(current) != *stored,
        None => true,
    }
}
