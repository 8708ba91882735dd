use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::cache::store::SessionMap;
use crate::types::identifiers::SessionId;

/// TTL plus LRU-by-count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub timeout: Duration,
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: Vec<SessionId>,
    pub trimmed: Vec<SessionId>,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.expired.len() + self.trimmed.len()
    }
}

/// Drop sessions idle longer than the timeout, then keep only the
/// `max_sessions` most recently used. Ties on `last_used` keep the lower id.
pub fn sweep(sessions: &mut SessionMap, policy: &EvictionPolicy, now: DateTime<Utc>) -> SweepReport {
    let mut report = SweepReport::default();

    sessions.retain(|id, session| {
        let idle = now.signed_duration_since(session.last_used);
        if idle > policy.timeout {
            info!(session_id = %id, "removed expired session");
            report.expired.push(id.clone());
            false
        } else {
            true
        }
    });

    if sessions.len() > policy.max_sessions {
        let mut by_recency: Vec<(DateTime<Utc>, SessionId)> = sessions
            .iter()
            .map(|(id, s)| (s.last_used, id.clone()))
            .collect();
        by_recency.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        for (_, id) in by_recency.into_iter().skip(policy.max_sessions) {
            sessions.remove(&id);
            report.trimmed.push(id);
        }
        info!(
            kept = policy.max_sessions,
            trimmed = report.trimmed.len(),
            "kept most recent sessions"
        );
    }

    report
}
