//! Session-scoped file context cache for AI task runners.
//!
//! `context-cache` maps a (goal, file-selector set) pair to a durable cache
//! session, fingerprints every cached file to detect drift, and serves a
//! request from cache only when every selected file is unchanged. Sessions
//! expire by age and are trimmed by count on every resolution.
//!
//! State lives in a single JSON snapshot under the cache directory and is
//! rewritten whole after each mutation. One process, one writer.

pub mod cache;
pub mod document;
pub mod selection;
pub mod types;
