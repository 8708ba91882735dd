use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::session::CacheSession;
use crate::types::identifiers::SessionId;

/// The whole persisted state: session id to session record.
pub type SessionMap = BTreeMap<SessionId, CacheSession>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable whole-snapshot storage for sessions.
///
/// Every save rewrites the full map. No locking; concurrent writers race
/// and the last rename wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub const FILE_NAME: &'static str = "sessions.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load. A missing file is an empty store, not an error.
    pub fn load(&self) -> Result<SessionMap, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SessionMap::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut sessions: SessionMap = serde_json::from_str(&raw)?;
        for (id, session) in sessions.iter_mut() {
            if session.reconcile() {
                debug!(session_id = %id, "corrected stale file_count on load");
            }
        }
        Ok(sessions)
    }

    /// Load, falling back to an empty store on any failure.
    pub fn load_or_empty(&self) -> SessionMap {
        match self.load() {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load cache sessions, starting empty");
                SessionMap::new()
            }
        }
    }

    /// Persist the full snapshot: write a sibling temp file, then rename.
    pub fn save(&self, sessions: &SessionMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let temp_path = self.temp_path();
        let result = write_snapshot(&temp_path, sessions).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))
        });

        if result.is_err() && temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!(path = %temp_path.display(), error = %e, "failed to remove partial snapshot");
            }
        }
        result
    }

    /// Sibling file a snapshot is staged in before the rename.
    pub fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

fn write_snapshot(path: &Path, sessions: &SessionMap) -> Result<(), StoreError> {
    let f = fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut writer, sessions)?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))
}
