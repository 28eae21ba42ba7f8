//! Content hashing for generated definitions.
//!
//! Every rendered or scanned definition carries a [`ContentHash`] so the
//! planner can compare desired and on-disk state without keeping both bodies
//! around, and so reports can show a stable short fingerprint.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::consts::SHORT_HASH_LEN;

/// A full 64-character SHA-256 hash of a definition body.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string, e.g. `"9f86d081884c7d65..."`.
/// Serializes as the bare hex string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// The leading characters used in human-facing output.
  pub fn short(&self) -> &str {
    let len = self.0.len().min(SHORT_HASH_LEN);
    &self.0[..len]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash a UTF-8 document body.
pub fn hash_str(content: &str) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(content.as_bytes());
  ContentHash(hex::encode(hasher.finalize()))
}
