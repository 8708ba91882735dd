use context_cache::types::{ContextBundle, FileBlock};

fn bundle(blocks: &[(&str, &str)]) -> ContextBundle {
    blocks.iter().map(|(p, c)| FileBlock::new(*p, *c)).collect()
}

#[test]
fn render_uses_labeled_blocks_joined_by_newline() {
    let b = bundle(&[("a.md", "alpha"), ("b.md", "beta")]);

    assert_eq!(b.render(), "=== FILE: a.md ===\nalpha\n\n=== FILE: b.md ===\nbeta\n");
}

#[test]
fn parse_recovers_rendered_blocks_exactly() {
    let b = bundle(&[
        ("src/app.ts", "export const x = 1;\n"),
        ("empty.md", ""),
        ("notes.md", "line one\n\nline three"),
        ("last.md", "trailing\n\n"),
    ]);

    assert_eq!(ContextBundle::parse(&b.render()), b);
}

#[test]
fn parse_ignores_text_before_first_header() {
    let text = "preamble\n=== FILE: a.md ===\nalpha\n";
    let parsed = ContextBundle::parse(text);

    assert_eq!(parsed, bundle(&[("a.md", "alpha")]));
}

#[test]
fn parse_of_text_without_headers_is_empty() {
    assert!(ContextBundle::parse("just some prose\n=== not a header ===\n").is_empty());
    assert!(ContextBundle::parse("").is_empty());
}

#[test]
fn get_returns_first_block_for_path() {
    let b = bundle(&[("a.md", "first"), ("a.md", "second")]);

    assert_eq!(b.get("a.md"), Some("first"));
    assert_eq!(b.get("b.md"), None);
    assert_eq!(b.len(), 2);
}

#[test]
fn header_at_end_of_text_has_empty_body() {
    let parsed = ContextBundle::parse("=== FILE: a.md ===");

    assert_eq!(parsed, bundle(&[("a.md", "")]));
}
