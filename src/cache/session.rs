use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::FileEntry;
use crate::types::identifiers::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Resolved at least once, never written.
    New,
    /// Holds the files of its last successful write.
    Populated,
}

/// One cache scope, keyed by (goal, selector set).
///
/// `file_count` always equals `files.len()`; both only change through
/// `replace_files`, which swaps the whole mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSession {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    /// Truncated goal text, for humans.
    pub goal_context: String,
    file_count: usize,
    files: BTreeMap<String, FileEntry>,
}

impl CacheSession {
    pub fn new(session_id: SessionId, goal: &str, summary_chars: usize, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            created_at: now,
            last_used: now,
            goal_context: truncate_goal(goal, summary_chars),
            file_count: 0,
            files: BTreeMap::new(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_used = now;
    }

    pub fn replace_files(&mut self, files: BTreeMap<String, FileEntry>, now: DateTime<Utc>) {
        self.file_count = files.len();
        self.files = files;
        self.last_used = now;
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn files(&self) -> &BTreeMap<String, FileEntry> {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    pub fn state(&self) -> SessionState {
        if self.files.is_empty() {
            SessionState::New
        } else {
            SessionState::Populated
        }
    }

    /// Restore `file_count` after loading a hand-edited snapshot.
    pub(crate) fn reconcile(&mut self) -> bool {
        let actual = self.files.len();
        let drifted = self.file_count != actual;
        self.file_count = actual;
        drifted
    }

    pub fn summary(&self, now: DateTime<Utc>, active: bool) -> SessionSummary {
        let age = now.signed_duration_since(self.created_at);
        SessionSummary {
            session_id: self.session_id.clone(),
            file_count: self.file_count,
            age_hours: age.num_seconds() as f64 / 3600.0,
            goal: self.goal_context.clone(),
            last_used: self.last_used,
            active,
        }
    }
}

/// First `max_chars` characters of `goal`.
pub fn truncate_goal(goal: &str, max_chars: usize) -> String {
    goal.chars().take(max_chars).collect()
}

/// One line of the human-readable session inventory.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub file_count: usize,
    pub age_hours: f64,
    pub goal: String,
    pub last_used: DateTime<Utc>,
    pub active: bool,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.active { "active" } else { "inactive" };
        writeln!(
            f,
            "  [{status}] {} ({} files, {:.1}h old)",
            self.session_id, self.file_count, self.age_hours
        )?;
        writeln!(f, "    Goal: {}", self.goal)?;
        write!(f, "    Last used: {}", self.last_used.to_rfc3339())
    }
}
