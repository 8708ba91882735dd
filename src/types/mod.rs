pub mod context_bundle;
pub mod identifiers;

pub use context_bundle::{ContextBundle, FileBlock};
pub use identifiers::{normalize_rel_path, ContentHash, SessionId};
