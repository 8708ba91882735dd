use serde::{Deserialize, Serialize};

const HEADER_PREFIX: &str = "=== FILE: ";
const HEADER_SUFFIX: &str = " ===";

/// One labeled file in assembled context text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlock {
    pub path: String,
    pub content: String,
}

impl FileBlock {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    fn render(&self) -> String {
        format!("{HEADER_PREFIX}{}{HEADER_SUFFIX}\n{}\n", self.path, self.content)
    }
}

/// Assembled context: an ordered run of labeled file blocks.
///
/// Text form, per block: `=== FILE: <path> ===\n<content>\n`, blocks joined
/// by `\n`. `parse(render(b)) == b` for any bundle whose contents contain no
/// header lines of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBundle {
    pub blocks: Vec<FileBlock>,
}

impl ContextBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: FileBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// First block labeled `path`, if any.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.path == path)
            .map(|b| b.content.as_str())
    }

    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .map(FileBlock::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Split assembled text back into blocks. Text before the first header
    /// is ignored.
    pub fn parse(text: &str) -> Self {
        // (header start, body start, path)
        let mut headers: Vec<(usize, usize, &str)> = Vec::new();

        let line_starts = std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1));
        for start in line_starts {
            let rest = &text[start..];
            if !rest.starts_with(HEADER_PREFIX) {
                continue;
            }
            let line_len = rest.find('\n').unwrap_or(rest.len());
            let line = &rest[..line_len];
            let Some(path) = line
                .strip_prefix(HEADER_PREFIX)
                .and_then(|l| l.strip_suffix(HEADER_SUFFIX))
            else {
                continue;
            };
            let body_start = (start + line_len + 1).min(text.len());
            headers.push((start, body_start, path));
        }

        let mut bundle = ContextBundle::new();
        for (i, &(_, body_start, path)) in headers.iter().enumerate() {
            let is_last = i + 1 == headers.len();
            let body_end = if is_last { text.len() } else { headers[i + 1].0 };
            let mut body = &text[body_start..body_end];

            // Undo the join separator, then the block terminator.
            if !is_last {
                body = body.strip_suffix('\n').unwrap_or(body);
            }
            body = body.strip_suffix('\n').unwrap_or(body);

            bundle.push(FileBlock::new(path, body));
        }

        bundle
    }
}

impl FromIterator<FileBlock> for ContextBundle {
    fn from_iter<I: IntoIterator<Item = FileBlock>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}
