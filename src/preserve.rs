//! Allowlist of comment patterns that must survive stripping.
//!
//! A pattern without `*` matches when the comment contains it. A pattern
//! with `*` is a wildcard: non-star ends anchor to the start/end of the
//! comment and interior segments must appear in order.

/// Patterns used when no config file supplies any.
pub const DEFAULT_PRESERVE: &[&str] = &[
    "TODO:",
    "FIXME:",
    "HACK:",
    "XXX:",
    "@ts-ignore",
    "@ts-expect-error",
    "eslint-",
    "prettier-ignore",
    "pylint:",
    "mypy:",
    "type: ignore",
];

/// Ordered set of preserve patterns, loaded once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreserveRules {
    patterns: Vec<String>,
}

impl PreserveRules {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// A rule set that preserves nothing.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, comment: &str) -> bool {
        should_preserve(comment, &self.patterns)
    }
}

impl Default for PreserveRules {
    fn default() -> Self {
        Self::new(DEFAULT_PRESERVE.iter().map(|p| p.to_string()).collect())
    }
}

/// True if any pattern matches the (trimmed) comment text.
pub fn should_preserve<S: AsRef<str>>(comment: &str, patterns: &[S]) -> bool {
    let comment = comment.trim();
    patterns
        .iter()
        .any(|pattern| matches_pattern(comment, pattern.as_ref()))
}

fn matches_pattern(text: &str, pattern: &str) -> bool {
    if pattern.contains('*') {
        matches_wildcard(text, pattern)
    } else {
        text.contains(pattern)
    }
}

fn matches_wildcard(text: &str, pattern: &str) -> bool {
    let mut parts: Vec<&str> = pattern.split('*').collect();
    let mut rest = text;

    // First segment is either an anchored prefix or the empty string before a leading `*`.
    let first = parts.remove(0);
    if !pattern.starts_with('*') {
        match rest.strip_prefix(first) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }

    if !pattern.ends_with('*')
        && let Some(last) = parts.pop()
    {
        match rest.strip_suffix(last) {
            Some(head) => rest = head,
            None => return false,
        }
    }

    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }

    true
}
