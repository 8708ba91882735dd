use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::Fingerprint;

/// One cached file.
///
/// Immutable once captured; a session replaces entries wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    /// Exactly what the reader returned, truncation notice included.
    pub content: String,
    #[serde(flatten)]
    pub fingerprint: Fingerprint,
    pub cached_at: DateTime<Utc>,
}

impl FileEntry {
    pub fn capture(
        path: impl Into<String>,
        content: impl Into<String>,
        fingerprint: Fingerprint,
        cached_at: DateTime<Utc>,
    ) -> Self {
        FileEntry {
            path: path.into(),
            content: content.into(),
            fingerprint,
            cached_at,
        }
    }

    /// Whether the file on disk still looks like what was captured.
    pub fn is_current(&self, on_disk: &Fingerprint) -> bool {
        self.fingerprint.matches(on_disk)
    }
}
