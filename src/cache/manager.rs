use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::config::CacheConfig;
use crate::cache::eviction::{sweep, EvictionPolicy, SweepReport};
use crate::cache::session::{CacheSession, SessionSummary};
use crate::cache::store::{SessionMap, SessionStore};
use crate::document::{FileEntry, Fingerprint};
use crate::selection::{apply_limit, LimitResult, SpecExpander};
use crate::types::context_bundle::{ContextBundle, FileBlock};
use crate::types::identifiers::SessionId;

/// Result of `get_cached_context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(CacheHit),
    Miss(CacheMiss),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub session_id: SessionId,
    /// Labeled blocks for the requested files, in expansion order.
    pub content: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMiss {
    pub session_id: SessionId,
    pub missing: Vec<String>,
    pub changed: Vec<String>,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn session_id(&self) -> &SessionId {
        match self {
            CacheLookup::Hit(hit) => &hit.session_id,
            CacheLookup::Miss(miss) => &miss.session_id,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            CacheLookup::Hit(hit) => Some(&hit.content),
            CacheLookup::Miss(_) => None,
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            CacheLookup::Hit(hit) => Some(hit.content),
            CacheLookup::Miss(_) => None,
        }
    }
}

/// Result of `cache_context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWrite {
    pub session_id: SessionId,
    pub files_cached: usize,
    /// Selected files beyond the per-session cap.
    pub files_over_cap: usize,
    /// False when the snapshot could not be written; the in-memory cache
    /// still holds the session for this process.
    pub persisted: bool,
}

/// What `reset_cache` should drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTarget {
    All,
    Session(SessionId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResetTargetError {
    #[error("Reset target must be a session id or \"all\"")]
    Empty,
}

impl FromStr for ResetTarget {
    type Err = ResetTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(ResetTargetError::Empty)
        } else if s.eq_ignore_ascii_case("all") {
            Ok(ResetTarget::All)
        } else {
            Ok(ResetTarget::Session(SessionId::from_raw(s)))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared { sessions: usize },
    Removed(SessionId),
    NotFound(SessionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub sessions: usize,
    pub total_files: usize,
    pub current_session: Option<SessionId>,
    pub max_files_per_session: usize,
    pub session_timeout_hours: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sessions: {}", self.sessions)?;
        writeln!(f, "Total cached files: {}", self.total_files)?;
        match &self.current_session {
            Some(id) => writeln!(f, "Current session: {id}")?,
            None => writeln!(f, "Current session: none")?,
        }
        writeln!(f, "Max files per session: {}", self.max_files_per_session)?;
        write!(f, "Session timeout: {}h", self.session_timeout_hours)
    }
}

/// Orchestrates session lookup, validity checks, population and eviction.
///
/// Single-threaded. The store is read once at `open` and rewritten whole
/// after every mutation.
#[derive(Debug)]
pub struct CacheManager {
    config: CacheConfig,
    store: SessionStore,
    expander: SpecExpander,
    sessions: SessionMap,
    current_session: Option<SessionId>,
}

impl CacheManager {
    pub fn open(config: CacheConfig) -> Self {
        let store = SessionStore::in_dir(&config.cache_dir);
        let sessions = store.load_or_empty();
        debug!(path = %store.path().display(), sessions = sessions.len(), "opened context cache");

        let expander = SpecExpander::default().excluding(&config.cache_dir);
        Self {
            config,
            store,
            expander,
            sessions,
            current_session: None,
        }
    }

    /// Replace the expander. The cache directory stays excluded.
    pub fn with_expander(mut self, expander: SpecExpander) -> Self {
        self.expander = expander.excluding(&self.config.cache_dir);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    pub fn session(&self, id: &SessionId) -> Option<&CacheSession> {
        self.sessions.get(id)
    }

    pub fn current_session(&self) -> Option<&SessionId> {
        self.current_session.as_ref()
    }

    /// Find or create the session for (goal, selectors), bump it, sweep,
    /// persist.
    pub fn resolve_session<S: AsRef<str>>(&mut self, goal: &str, selectors: &[S]) -> SessionId {
        let session_id = self.resolve_unsaved(goal, selectors);
        self.persist();
        session_id
    }

    /// `resolve_session` minus the save, for callers that persist anyway.
    fn resolve_unsaved<S: AsRef<str>>(&mut self, goal: &str, selectors: &[S]) -> SessionId {
        let session_id = SessionId::derive(goal, selectors);
        let now = Utc::now();

        match self.sessions.get_mut(&session_id) {
            Some(session) => {
                session.touch(now);
                info!(session_id = %session_id, "reusing existing session");
            }
            None => {
                let session = CacheSession::new(
                    session_id.clone(),
                    goal,
                    self.config.goal_summary_chars,
                    now,
                );
                self.sessions.insert(session_id.clone(), session);
                info!(session_id = %session_id, "created new session");
            }
        }

        self.current_session = Some(session_id.clone());
        self.sweep();
        session_id
    }

    /// Serve the whole request from cache, or report why not.
    ///
    /// Any missing or drifted file is a miss for the entire request.
    pub fn get_cached_context<S: AsRef<str>>(
        &mut self,
        repo_root: &Path,
        selectors: &[S],
        goal: &str,
    ) -> CacheLookup {
        let session_id = self.resolve_session(goal, selectors);
        let files = self
            .expander
            .expand(repo_root, selectors, self.config.selector_limit);

        let Some(session) = self.sessions.get(&session_id) else {
            return CacheLookup::Miss(CacheMiss {
                session_id,
                missing: files,
                changed: Vec::new(),
            });
        };

        let mut missing = Vec::new();
        let mut changed = Vec::new();
        for path in &files {
            match session.file(path) {
                None => missing.push(path.clone()),
                Some(entry) => {
                    if !entry.is_current(&Fingerprint::of(&repo_root.join(path))) {
                        changed.push(path.clone());
                    }
                }
            }
        }

        if session.file_count() > 0 && missing.is_empty() && changed.is_empty() {
            let bundle: ContextBundle = files
                .iter()
                .filter_map(|path| session.file(path))
                .map(|entry| FileBlock::new(entry.path.clone(), entry.content.clone()))
                .collect();
            info!(session_id = %session_id, files = bundle.len(), "cache hit");

            return CacheLookup::Hit(CacheHit {
                session_id,
                content: bundle.render(),
                file_count: bundle.len(),
            });
        }

        if !missing.is_empty() {
            info!(session_id = %session_id, files = missing.len(), "cache miss: files not cached");
        }
        if !changed.is_empty() {
            info!(session_id = %session_id, files = changed.len(), "cache invalidated: files changed");
        }

        CacheLookup::Miss(CacheMiss {
            session_id,
            missing,
            changed,
        })
    }

    /// Replace the session's files with those in `assembled`.
    ///
    /// Files are taken in expansion order up to `max_files_per_session`.
    /// A selected file is skipped when it has no block in `assembled` or
    /// cannot be fingerprinted.
    pub fn cache_context<S: AsRef<str>>(
        &mut self,
        repo_root: &Path,
        selectors: &[S],
        goal: &str,
        assembled: &str,
    ) -> CacheWrite {
        let session_id = self.resolve_unsaved(goal, selectors);
        let selected = self
            .expander
            .expand(repo_root, selectors, self.config.selector_limit);

        let cap = self.config.max_files_per_session;
        let LimitResult { kept, dropped } = apply_limit(selected, cap);
        if dropped > 0 {
            warn!(
                selected = kept.len() + dropped,
                cap,
                "selected files exceed cache limit; consider more specific selectors"
            );
        }

        let bundle = ContextBundle::parse(assembled);
        let now = Utc::now();
        let mut entries = BTreeMap::new();

        for path in kept {
            let Some(content) = bundle.get(&path) else {
                debug!(path = %path, "no block for selected file, not caching");
                continue;
            };
            let fingerprint = match Fingerprint::try_of(&repo_root.join(&path)) {
                Ok(fp) => fp,
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to cache file");
                    continue;
                }
            };
            entries.insert(
                path.clone(),
                FileEntry::capture(path, content, fingerprint, now),
            );
        }

        let files_cached = entries.len();
        match self.sessions.get_mut(&session_id) {
            Some(session) => session.replace_files(entries, now),
            None => {
                // Only reachable with max_sessions == 0.
                warn!(session_id = %session_id, "session evicted before it could be written");
                self.persist();
                return CacheWrite {
                    session_id,
                    files_cached: 0,
                    files_over_cap: dropped,
                    persisted: false,
                };
            }
        }

        self.sweep();
        let persisted = self.persist();
        info!(session_id = %session_id, files = files_cached, "cached files for future use");

        CacheWrite {
            session_id,
            files_cached,
            files_over_cap: dropped,
            persisted,
        }
    }

    pub fn reset_cache(&mut self, target: &ResetTarget) -> ResetOutcome {
        match target {
            ResetTarget::All => {
                let sessions = self.sessions.len();
                self.sessions.clear();
                self.current_session = None;
                self.persist();
                info!(sessions, "reset all cache sessions");
                ResetOutcome::Cleared { sessions }
            }
            ResetTarget::Session(id) => {
                if self.sessions.remove(id).is_none() {
                    info!(session_id = %id, "session not found");
                    return ResetOutcome::NotFound(id.clone());
                }
                if self.current_session.as_ref() == Some(id) {
                    self.current_session = None;
                }
                self.persist();
                info!(session_id = %id, "reset cache for session");
                ResetOutcome::Removed(id.clone())
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            sessions: self.sessions.len(),
            total_files: self.sessions.values().map(CacheSession::file_count).sum(),
            current_session: self.current_session.clone(),
            max_files_per_session: self.config.max_files_per_session,
            session_timeout_hours: self.config.session_timeout_hours,
        }
    }

    /// Sessions, most recently used first.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let now = Utc::now();
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .iter()
            .map(|(id, s)| s.summary(now, self.current_session.as_ref() == Some(id)))
            .collect();
        summaries.sort_by(|a, b| {
            b.last_used
                .cmp(&a.last_used)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        summaries
    }

    fn sweep(&mut self) -> SweepReport {
        let policy = EvictionPolicy {
            timeout: self.config.session_timeout(),
            max_sessions: self.config.max_sessions,
        };
        let report = sweep(&mut self.sessions, &policy, Utc::now());

        if let Some(current) = &self.current_session {
            if !self.sessions.contains_key(current) {
                self.current_session = None;
            }
        }
        report
    }

    fn persist(&self) -> bool {
        match self.store.save(&self.sessions) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %self.store.path().display(), error = %e, "failed to save cache sessions");
                false
            }
        }
    }
}
