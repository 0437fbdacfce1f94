//! MD5 content fingerprint used as the migration de-duplication key.
//!
//! This is a change-detection fingerprint, not a security boundary. MD5 is
//! kept so the `md5` column stays compatible with existing databases.

use md5::{Digest, Md5};
use std::fmt;

/// Lowercase hex MD5 digest of a migration's raw bytes (32 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw migration content.
    pub fn of(content: &[u8]) -> Self {
        let digest = Md5::digest(content);
        Self(format!("{:x}", digest))
    }

    /// Wrap a digest read back from the bookkeeping table.
    pub(crate) fn from_stored(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
