pub mod config;
pub mod eviction;
pub mod manager;
pub mod session;
pub mod store;

pub use config::{CacheConfig, ConfigOverrides};
pub use eviction::{sweep, EvictionPolicy, SweepReport};
pub use manager::{
    CacheHit, CacheLookup, CacheManager, CacheMiss, CacheStats, CacheWrite, ResetOutcome,
    ResetTarget, ResetTargetError,
};
pub use session::{truncate_goal, CacheSession, SessionState, SessionSummary};
pub use store::{SessionMap, SessionStore, StoreError};
