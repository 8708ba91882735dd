use std::collections::HashMap;
use std::path::PathBuf;

use context_cache::cache::config::{
    ENV_CACHE_DIR, ENV_MAX_FILES, ENV_MAX_SESSIONS, ENV_TIMEOUT_HOURS,
};
use context_cache::cache::{CacheConfig, ConfigOverrides};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_explicit() {
    let config = CacheConfig::v0();

    assert_eq!(config.cache_dir, PathBuf::from(".ai_agents_cache"));
    assert_eq!(config.max_files_per_session, 40);
    assert_eq!(config.max_sessions, 10);
    assert_eq!(config.session_timeout_hours, 24);
    assert_eq!(config.store_path(), PathBuf::from(".ai_agents_cache/sessions.json"));
    assert_eq!(config.session_timeout(), chrono::Duration::hours(24));
    assert_eq!(CacheConfig::default(), config);
}

#[test]
fn environment_overrides_defaults() {
    let config = CacheConfig::from_lookup(lookup(&[
        (ENV_CACHE_DIR, "/tmp/ctx"),
        (ENV_MAX_FILES, "5"),
        (ENV_MAX_SESSIONS, " 3 "),
        (ENV_TIMEOUT_HOURS, "1"),
    ]));

    assert_eq!(config.cache_dir, PathBuf::from("/tmp/ctx"));
    assert_eq!(config.max_files_per_session, 5);
    assert_eq!(config.max_sessions, 3);
    assert_eq!(config.session_timeout_hours, 1);
}

#[test]
fn blank_and_unparsable_values_are_ignored() {
    let config = CacheConfig::from_lookup(lookup(&[
        (ENV_CACHE_DIR, "   "),
        (ENV_MAX_FILES, "lots"),
        (ENV_MAX_SESSIONS, "-1"),
    ]));

    assert_eq!(config, CacheConfig::v0());
}

#[test]
fn explicit_overrides_beat_environment() {
    let from_env = CacheConfig::from_lookup(lookup(&[
        (ENV_CACHE_DIR, "/tmp/from-env"),
        (ENV_MAX_FILES, "5"),
        (ENV_MAX_SESSIONS, "3"),
    ]));

    let config = from_env.with_overrides(&ConfigOverrides {
        cache_dir: Some(PathBuf::from("/tmp/from-flag")),
        max_files_per_session: Some(7),
        max_sessions: None,
        session_timeout_hours: Some(2),
    });

    assert_eq!(config.cache_dir, PathBuf::from("/tmp/from-flag"));
    assert_eq!(config.max_files_per_session, 7);
    assert_eq!(config.max_sessions, 3);
    assert_eq!(config.session_timeout_hours, 2);
}

#[test]
fn empty_overrides_change_nothing() {
    let config = CacheConfig::v0().with_overrides(&ConfigOverrides::default());

    assert_eq!(config, CacheConfig::v0());
}
