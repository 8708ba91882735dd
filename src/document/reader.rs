use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::selection::SpecExpander;
use crate::types::context_bundle::{ContextBundle, FileBlock};

pub const DEFAULT_MAX_BYTES: usize = 200_000;

/// Appended to content cut at the byte limit.
pub const TRUNCATION_NOTICE: &str = "\n/* ...truncated... */\n";

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a file as text, lossily, cut to `max_bytes`.
pub fn read_small_file(path: &Path, max_bytes: usize) -> Result<String, ReadError> {
    let data = fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if data.len() > max_bytes {
        let mut text = String::from_utf8_lossy(&data[..max_bytes]).into_owned();
        text.push_str(TRUNCATION_NOTICE);
        Ok(text)
    } else {
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

/// Assembles context text from disk for a set of selectors.
///
/// Only allow-listed extensions are read, even for selectors naming a file
/// directly.
#[derive(Debug, Clone)]
pub struct ContextCollector {
    expander: SpecExpander,
    max_bytes: usize,
}

impl Default for ContextCollector {
    fn default() -> Self {
        Self::new(SpecExpander::default(), DEFAULT_MAX_BYTES)
    }
}

impl ContextCollector {
    pub fn new(expander: SpecExpander, max_bytes: usize) -> Self {
        Self { expander, max_bytes }
    }

    pub fn collect<S: AsRef<str>>(&self, root: &Path, selectors: &[S], limit: usize) -> ContextBundle {
        let mut bundle = ContextBundle::new();

        for rel in self.expander.expand(root, selectors, limit) {
            let abs = root.join(&rel);
            if !abs.is_file() || !self.expander.is_allowed(&abs) {
                continue;
            }
            match read_small_file(&abs, self.max_bytes) {
                Ok(content) => bundle.push(FileBlock::new(rel, content)),
                Err(e) => warn!(error = %e, "skipping unreadable context file"),
            }
        }

        bundle
    }
}
