use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::identifiers::ContentHash;

/// Cheap, comparable identity of a file on disk.
///
/// `mtime` is nanoseconds since the Unix epoch; integers survive the JSON
/// snapshot exactly, floats need not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub mtime: i64,
    pub size: u64,
    pub content_hash: ContentHash,
}

impl Fingerprint {
    /// Fingerprint `path`, or the unreadable sentinel on any failure.
    pub fn of(path: &Path) -> Self {
        match Self::try_of(path) {
            Ok(fp) => fp,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "fingerprint failed, treating as changed");
                Self::unreadable()
            }
        }
    }

    /// Reads the whole file to hash it. Not a security property.
    pub fn try_of(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        let mtime = meta.modified().map(system_time_nanos)?;
        let content = fs::read(path)?;

        Ok(Fingerprint {
            mtime,
            size: meta.len(),
            content_hash: ContentHash::from_content(&content),
        })
    }

    pub fn unreadable() -> Self {
        Fingerprint {
            mtime: 0,
            size: 0,
            content_hash: ContentHash::unreadable(),
        }
    }

    pub fn is_unreadable(&self) -> bool {
        self.content_hash.is_unreadable()
    }

    /// Equality that never holds when either side is the sentinel, so a
    /// broken file always reads as changed.
    pub fn matches(&self, other: &Fingerprint) -> bool {
        !self.is_unreadable() && !other.is_unreadable() && self == other
    }
}

fn system_time_nanos(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}
