/// Outcome of capping a sequence to its first `limit` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitResult<T> {
    pub kept: Vec<T>,
    pub dropped: usize,
}

impl<T> LimitResult<T> {
    pub fn was_truncated(&self) -> bool {
        self.dropped > 0
    }
}

/// Keep the first `limit` items in iteration order, count the rest.
///
/// Order is the caller's responsibility; this never reorders.
pub fn apply_limit<T, I>(items: I, limit: usize) -> LimitResult<T>
where
    I: IntoIterator<Item = T>,
{
    let mut kept = Vec::new();
    let mut dropped = 0;

    for item in items {
        if kept.len() < limit {
            kept.push(item);
        } else {
            dropped += 1;
        }
    }

    LimitResult { kept, dropped }
}
