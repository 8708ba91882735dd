pub mod limits;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::types::identifiers::normalize_rel_path;
pub use limits::{apply_limit, LimitResult};

/// Extensions picked up when a selector names a directory.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
	"svelte", "ts", "tsx", "js", "jsx", "md", "css", "scss", "html", "rs", "py", "go", "json",
	"toml", "yaml", "yml", "txt",
];

/// How a single selector is interpreted against the repo root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorKind {
	/// An existing regular file. Included whatever its extension.
	File(PathBuf),
	/// An existing directory. Walked recursively, allow-listed extensions only.
	Directory(PathBuf),
	/// Anything else. Matched as a glob (`**` recurses), files only.
	Pattern(PathBuf),
}

impl SelectorKind {
	pub fn classify(root: &Path, selector: &str) -> Self {
		let abs = root.join(selector);
		if abs.is_file() {
			SelectorKind::File(abs)
		} else if abs.is_dir() {
			SelectorKind::Directory(abs)
		} else {
			SelectorKind::Pattern(abs)
		}
	}
}

/// Turns path/directory/glob selectors into repo-relative file paths.
#[derive(Debug, Clone)]
pub struct SpecExpander {
	allowed_extensions: Vec<String>,
	excluded: Vec<PathBuf>,
}

impl Default for SpecExpander {
	fn default() -> Self {
		Self::new(ALLOWED_EXTENSIONS.iter().copied())
	}
}

impl SpecExpander {
	pub fn new<I, S>(allowed_extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			allowed_extensions: allowed_extensions
				.into_iter()
				.map(|e| e.into().trim_start_matches('.').to_lowercase())
				.collect(),
			excluded: Vec::new(),
		}
	}

	/// Never select anything under `dir`, e.g. the cache's own directory.
	/// Relative paths resolve against the working directory.
	pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
		self.excluded.push(dir.into());
		self
	}

	/// Excluded directories that lie under `root`, relative to it.
	fn excluded_prefixes(&self, root: &Path) -> Vec<PathBuf> {
		if self.excluded.is_empty() {
			return Vec::new();
		}
		let Ok(canonical_root) = fs::canonicalize(root) else {
			return Vec::new();
		};
		self.excluded
			.iter()
			.filter_map(|dir| fs::canonicalize(dir).ok())
			.filter_map(|dir| dir.strip_prefix(&canonical_root).ok().map(Path::to_path_buf))
			.filter(|rel| !rel.as_os_str().is_empty())
			.collect()
	}

	pub fn is_allowed(&self, path: &Path) -> bool {
		path.extension()
			.and_then(|e| e.to_str())
			.map(|e| e.to_lowercase())
			.is_some_and(|e| self.allowed_extensions.iter().any(|a| *a == e))
	}

	/// Expand `selectors` under `root`, deduplicate, then keep the first
	/// `limit` paths in lexicographic order.
	///
	/// The returned order is the expansion order used everywhere else.
	pub fn expand<S: AsRef<str>>(&self, root: &Path, selectors: &[S], limit: usize) -> Vec<String> {
		let mut files = BTreeSet::new();
		let excluded = self.excluded_prefixes(root);

		for selector in selectors {
			let selector = selector.as_ref();
			match SelectorKind::classify(root, selector) {
				SelectorKind::File(_) => {
					if let Some(rel) = normalize_rel_path(Path::new(selector)) {
						files.insert(rel);
					}
				}
				SelectorKind::Directory(dir) => self.walk_directory(root, &dir, &excluded, &mut files),
				SelectorKind::Pattern(_) => match_pattern(root, selector, &mut files),
			}
		}

		if !excluded.is_empty() {
			files.retain(|rel| !is_under(Path::new(rel), &excluded));
		}

		let LimitResult { kept, dropped } = apply_limit(files, limit);
		if dropped > 0 {
			debug!(limit, dropped, "selector expansion truncated");
		}
		kept
	}

	fn walk_directory(&self, root: &Path, dir: &Path, excluded: &[PathBuf], files: &mut BTreeSet<String>) {
		let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
			excluded.is_empty()
				|| entry
					.path()
					.strip_prefix(root)
					.map_or(true, |rel| !is_under(rel, excluded))
		});
		for entry in walker {
			let entry = match entry {
				Ok(entry) => entry,
				Err(e) => {
					debug!(error = %e, "skipping unreadable directory entry");
					continue;
				}
			};
			if !entry.file_type().is_file() || !self.is_allowed(entry.path()) {
				continue;
			}
			if let Some(rel) = relative_to(root, entry.path()) {
				files.insert(rel);
			}
		}
	}
}

/// Expand with the default extension allow-list.
pub fn expand<S: AsRef<str>>(root: &Path, selectors: &[S], limit: usize) -> Vec<String> {
	SpecExpander::default().expand(root, selectors, limit)
}

fn is_under(rel: &Path, prefixes: &[PathBuf]) -> bool {
	prefixes.iter().any(|prefix| rel.starts_with(prefix))
}

/// Glob `selector` under `root`. The root is matched literally; only the
/// selector contributes wildcards.
fn match_pattern(root: &Path, selector: &str, files: &mut BTreeSet<String>) {
	let pattern = if Path::new(selector).is_absolute() {
		PathBuf::from(selector)
	} else {
		let Some(root_str) = root.to_str() else {
			warn!(root = %root.display(), "repo root is not valid UTF-8, glob selectors match nothing");
			return;
		};
		Path::new(&Pattern::escape(root_str)).join(selector)
	};
	let Some(pattern_str) = pattern.to_str() else {
		warn!(pattern = %pattern.display(), "glob selector is not valid UTF-8");
		return;
	};

	let matches = match glob::glob_with(pattern_str, MatchOptions::new()) {
		Ok(matches) => matches,
		Err(e) => {
			warn!(pattern = pattern_str, error = %e, "invalid glob selector, matching nothing");
			return;
		}
	};

	for path in matches.flatten() {
		if !path.is_file() {
			continue;
		}
		if let Some(rel) = relative_to(root, &path) {
			files.insert(rel);
		}
	}
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
	match path.strip_prefix(root) {
		Ok(rel) => normalize_rel_path(rel),
		Err(_) => {
			debug!(path = %path.display(), "match outside repo root, skipping");
			None
		}
	}
}
