pub mod entry;
pub mod fingerprint;
pub mod reader;

pub use entry::FileEntry;
pub use fingerprint::Fingerprint;
pub use reader::{read_small_file, ContextCollector, ReadError, DEFAULT_MAX_BYTES, TRUNCATION_NOTICE};
