use std::fs;
use std::path::Path;

use context_cache::selection::{apply_limit, expand, SelectorKind, SpecExpander};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn file_selector_is_included_regardless_of_extension() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Makefile", "all:");
    write(dir.path(), "data.bin", "\0\0");

    let files = expand(dir.path(), &["Makefile", "data.bin"], 100);

    assert_eq!(files, vec!["Makefile".to_string(), "data.bin".to_string()]);
}

#[test]
fn directory_selector_recurses_with_extension_allow_list() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/app.ts", "");
    write(dir.path(), "src/components/Button.svelte", "");
    write(dir.path(), "src/styles/main.scss", "");
    write(dir.path(), "src/logo.png", "");
    write(dir.path(), "src/.env", "");

    let files = expand(dir.path(), &["src"], 100);

    assert_eq!(
        files,
        vec![
            "src/app.ts".to_string(),
            "src/components/Button.svelte".to_string(),
            "src/styles/main.scss".to_string(),
        ]
    );
}

#[test]
fn glob_selector_supports_recursive_wildcards_without_extension_filter() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/one.lock", "");
    write(dir.path(), "a/b/c/two.lock", "");
    write(dir.path(), "a/b/three.ts", "");

    let files = expand(dir.path(), &["a/**/*.lock"], 100);

    assert_eq!(files, vec!["a/b/c/two.lock".to_string(), "a/one.lock".to_string()]);
}

#[test]
fn glob_matching_nothing_expands_to_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "");

    assert!(expand(dir.path(), &["missing/**/*.rs"], 100).is_empty());
    assert!(expand(dir.path(), &["does-not-exist.md"], 100).is_empty());
}

#[test]
fn invalid_glob_matches_nothing_instead_of_failing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "");

    let files = expand(dir.path(), &["[", "a.md"], 100);

    assert_eq!(files, vec!["a.md".to_string()]);
}

#[test]
fn overlapping_selectors_are_deduplicated() {
    let dir = tempdir().unwrap();
    write(dir.path(), "docs/guide.md", "");
    write(dir.path(), "docs/api.md", "");

    let files = expand(dir.path(), &["docs", "docs/guide.md", "docs/*.md", "./docs/api.md"], 100);

    assert_eq!(files, vec!["docs/api.md".to_string(), "docs/guide.md".to_string()]);
}

#[test]
fn invariant_limit_keeps_lexicographically_first_paths() {
    let dir = tempdir().unwrap();
    for name in ["e.md", "b.md", "d.md", "a.md", "c.md"] {
        write(dir.path(), &format!("docs/{name}"), "");
    }

    let first = expand(dir.path(), &["docs"], 3);
    let second = expand(dir.path(), &["docs"], 3);

    assert_eq!(
        first,
        vec!["docs/a.md".to_string(), "docs/b.md".to_string(), "docs/c.md".to_string()]
    );
    assert_eq!(first, second);
}

#[test]
fn custom_allow_list_is_normalized() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib/core.RS", "");
    write(dir.path(), "lib/readme.md", "");

    let expander = SpecExpander::new([".rs"]);
    let files = expander.expand(dir.path(), &["lib"], 100);

    assert_eq!(files, vec!["lib/core.RS".to_string()]);
}

#[test]
fn selectors_are_classified_against_the_root() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/app.ts", "");

    assert!(matches!(SelectorKind::classify(dir.path(), "src/app.ts"), SelectorKind::File(_)));
    assert!(matches!(SelectorKind::classify(dir.path(), "src"), SelectorKind::Directory(_)));
    assert!(matches!(SelectorKind::classify(dir.path(), "src/*.ts"), SelectorKind::Pattern(_)));
}

#[test]
fn apply_limit_keeps_order_and_counts_dropped() {
    let result = apply_limit(vec!["x", "y", "z"], 2);

    assert_eq!(result.kept, vec!["x", "y"]);
    assert_eq!(result.dropped, 1);
    assert!(result.was_truncated());

    let result = apply_limit(vec!["x"], 2);
    assert!(!result.was_truncated());
}

#[test]
fn glob_matches_under_root_containing_glob_metacharacters() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("proj[1]*");
    write(&root, "src/a.lock", "");
    write(&root, "src/deep/b.lock", "");

    assert_eq!(expand(&root, &["src/*.lock"], 100), vec!["src/a.lock".to_string()]);
    assert_eq!(
        expand(&root, &["**/*.lock"], 100),
        vec!["src/a.lock".to_string(), "src/deep/b.lock".to_string()]
    );
}

#[test]
fn excluded_directory_is_skipped_by_every_selector_kind() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "");
    write(dir.path(), ".cache/sessions.json", "{}");
    write(dir.path(), ".cache/nested/x.md", "");

    let expander = SpecExpander::default().excluding(dir.path().join(".cache"));

    assert_eq!(expander.expand(dir.path(), &["."], 100), vec!["a.md".to_string()]);
    assert_eq!(expander.expand(dir.path(), &["**/*"], 100), vec!["a.md".to_string()]);
    assert!(expander.expand(dir.path(), &[".cache/sessions.json"], 100).is_empty());
}

#[test]
fn excluding_the_root_itself_excludes_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "");

    let expander = SpecExpander::default().excluding(dir.path());

    assert_eq!(expander.expand(dir.path(), &["."], 100), vec!["a.md".to_string()]);
}
