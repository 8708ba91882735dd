use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Hex characters kept from the identity digest.
const SESSION_ID_LEN: usize = 12;

/// Hex characters kept from a file content digest.
const CONTENT_HASH_LEN: usize = 16;

/// Identity of a cache session.
///
/// Derived from the goal text (verbatim) and the selector set (sorted), so
/// the same inputs resolve to the same session across process restarts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn derive<S: AsRef<str>>(goal: &str, selectors: &[S]) -> Self {
        let mut sorted: Vec<&str> = selectors.iter().map(|s| s.as_ref()).collect();
        sorted.sort_unstable();

        let key = format!("{}|{}", goal, sorted.join("|"));

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hex = hex::encode(hasher.finalize());

        SessionId(hex[..SESSION_ID_LEN].to_string())
    }

    /// Wrap an id typed by an operator (e.g. `reset <id>`). No validation;
    /// an unknown id simply fails to match.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        SessionId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Truncated content digest used for drift detection only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hex = hex::encode(hasher.finalize());

        ContentHash(hex[..CONTENT_HASH_LEN].to_string())
    }

    /// The hash of nothing we could read. Never produced by `from_content`.
    pub fn unreadable() -> Self {
        ContentHash(String::new())
    }

    pub fn is_unreadable(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize a repo-relative path: forward slashes, no leading `./`.
///
/// Case is preserved; paths are compared byte-for-byte against disk.
pub fn normalize_rel_path(path: &Path) -> Option<String> {
    let s = path.to_str()?;

    let mut normalized = s.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }

    Some(normalized)
}
