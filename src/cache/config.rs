use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::store::SessionStore;

pub const ENV_CACHE_DIR: &str = "CONTEXT_CACHE_DIR";
pub const ENV_MAX_FILES: &str = "CONTEXT_CACHE_MAX_FILES";
pub const ENV_MAX_SESSIONS: &str = "CONTEXT_CACHE_MAX_SESSIONS";
pub const ENV_TIMEOUT_HOURS: &str = "CONTEXT_CACHE_TIMEOUT_HOURS";

const MAX_TIMEOUT_HOURS: u64 = 24 * 365 * 1000;

// Key point:
// Serializable
// Comparable
// Explicit defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub cache_dir: PathBuf,
    pub max_files_per_session: usize,
    pub max_sessions: usize,
    pub session_timeout_hours: u64,
    /// Expansion limit applied before the per-session cap.
    pub selector_limit: usize,
    /// Characters of goal text kept on a session for inspection.
    pub goal_summary_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::v0()
    }
}

impl CacheConfig {
    pub fn v0() -> Self {
        Self {
            cache_dir: PathBuf::from(".ai_agents_cache"),
            max_files_per_session: 40,
            max_sessions: 10,
            session_timeout_hours: 24,
            selector_limit: 100,
            goal_summary_chars: 100,
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Defaults, overridden by `CONTEXT_CACHE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`. Blank values are
    /// ignored; unparsable ones are warned about and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::v0();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_CACHE_DIR) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(n) = get(ENV_MAX_FILES).and_then(|v| parse_var(ENV_MAX_FILES, &v)) {
            config.max_files_per_session = n;
        }
        if let Some(n) = get(ENV_MAX_SESSIONS).and_then(|v| parse_var(ENV_MAX_SESSIONS, &v)) {
            config.max_sessions = n;
        }
        if let Some(n) = get(ENV_TIMEOUT_HOURS).and_then(|v| parse_var(ENV_TIMEOUT_HOURS, &v)) {
            config.session_timeout_hours = n;
        }

        config
    }

    /// Apply explicit settings (e.g. command-line flags) over whatever
    /// defaults and environment produced.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(dir) = &overrides.cache_dir {
            self.cache_dir = dir.clone();
        }
        if let Some(n) = overrides.max_files_per_session {
            self.max_files_per_session = n;
        }
        if let Some(n) = overrides.max_sessions {
            self.max_sessions = n;
        }
        if let Some(h) = overrides.session_timeout_hours {
            self.session_timeout_hours = h;
        }
        self
    }

    pub fn store_path(&self) -> PathBuf {
        self.cache_dir.join(SessionStore::FILE_NAME)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn session_timeout(&self) -> chrono::Duration {
        // Anything past a millennium never expires in practice.
        let hours = self.session_timeout_hours.min(MAX_TIMEOUT_HOURS) as i64;
        chrono::Duration::hours(hours)
    }
}

/// Settings that take precedence over the environment. `None` keeps the
/// underlying value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub cache_dir: Option<PathBuf>,
    pub max_files_per_session: Option<usize>,
    pub max_sessions: Option<usize>,
    pub session_timeout_hours: Option<u64>,
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value, "ignoring unparsable cache setting");
            None
        }
    }
}
