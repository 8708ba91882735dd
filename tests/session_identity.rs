use context_cache::types::SessionId;

#[test]
fn invariant_identity_is_deterministic() {
    let a = SessionId::derive("add dark mode", &["src/app.ts", "docs"]);
    let b = SessionId::derive("add dark mode", &["src/app.ts", "docs"]);

    assert_eq!(a, b);
}

#[test]
fn invariant_selector_order_does_not_affect_identity() {
    let a = SessionId::derive("goal", &["src/**/*.ts", "README.md", "docs"]);
    let b = SessionId::derive("goal", &["docs", "src/**/*.ts", "README.md"]);

    assert_eq!(a, b);
}

#[test]
fn invariant_goal_change_changes_identity() {
    let selectors = ["src", "README.md"];
    let a = SessionId::derive("fix the login form", &selectors);
    let b = SessionId::derive("fix the signup form", &selectors);

    assert_ne!(a, b);
}

#[test]
fn invariant_goal_whitespace_is_significant() {
    let a = SessionId::derive("fix bug", &["src"]);
    let b = SessionId::derive("fix  bug", &["src"]);
    let c = SessionId::derive("fix bug ", &["src"]);

    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn invariant_selector_set_change_changes_identity() {
    let a = SessionId::derive("goal", &["src"]);
    let b = SessionId::derive("goal", &["src", "docs"]);

    assert_ne!(a, b);
}

#[test]
fn identity_is_twelve_lowercase_hex_chars() {
    let id = SessionId::derive("goal", &["a.md"]);

    assert_eq!(id.as_str().len(), 12);
    assert!(id
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn identity_serializes_as_plain_string() {
    let id = SessionId::derive("goal", &["a.md"]);
    let json = serde_json::to_string(&id).unwrap();

    assert_eq!(json, format!("\"{}\"", id.as_str()));
}
