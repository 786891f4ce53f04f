//! Line-oriented comment stripping.
//!
//! The scanner works on one line at a time with plain marker strings and a
//! naive quote tracker instead of a real lexer. Block comments are only
//! recognised within a single line; an unterminated block start consumes
//! the rest of that line and no state is carried to the next one.

use crate::diff::LineRangeSet;
use crate::languages::LanguageRule;
use crate::preserve::PreserveRules;

/// Which comment forms to remove.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StripMode {
    #[default]
    Both,
    LineOnly,
    BlockOnly,
}

/// Per-run scanner settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOptions {
    pub mode: StripMode,
    /// Keep a line that held only a comment as its leading whitespace
    /// instead of dropping it.
    pub preserve_blank_lines: bool,
}

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stripped {
    Unchanged,
    Rewritten(String),
    /// The line was nothing but comment and disappears from the output.
    Removed,
}

impl Stripped {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Stripped::Unchanged)
    }

    /// The text written back for this line, `None` if it is dropped.
    pub fn output<'a>(&'a self, original: &'a str) -> Option<&'a str> {
        match self {
            Stripped::Unchanged => Some(original),
            Stripped::Rewritten(s) => Some(s),
            Stripped::Removed => None,
        }
    }
}

/// Byte index of the first `marker` occurrence outside a quoted region.
///
/// Quotes are `"`, `'` and `` ` ``. A closing quote preceded by a backslash
/// does not close the string; `\\"` is misread, which is accepted.
pub fn find_marker(text: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }

    let bytes = text.as_bytes();
    let needle = marker.as_bytes();
    let mut quote: Option<u8> = None;

    for i in 0..bytes.len() {
        let b = bytes[i];

        match quote {
            None if matches!(b, b'"' | b'\'' | b'`') => {
                quote = Some(b);
                continue;
            }
            Some(q) => {
                if b == q && i > 0 && bytes[i - 1] != b'\\' {
                    quote = None;
                }
                continue;
            }
            None => {}
        }

        if bytes[i..].starts_with(needle) {
            return Some(i);
        }
    }

    None
}

/// Strips comments from single lines for one language.
#[derive(Debug, Clone, Copy)]
pub struct LineScanner<'a> {
    rule: &'a LanguageRule,
    preserve: &'a PreserveRules,
    options: StripOptions,
}

impl<'a> LineScanner<'a> {
    pub fn new(rule: &'a LanguageRule, preserve: &'a PreserveRules, options: StripOptions) -> Self {
        Self {
            rule,
            preserve,
            options,
        }
    }

    /// Remove comments from `line`.
    ///
    /// A comment matching a preserve pattern vetoes every removal on the
    /// line: the line comes back unchanged even if other, unpreserved
    /// comments are present.
    pub fn strip(&self, line: &str) -> Stripped {
        let Some(result) = self.remove_comments(line) else {
            return Stripped::Unchanged;
        };

        let result = result.trim_end_matches([' ', '\t']);
        if result.trim().is_empty() {
            if self.options.preserve_blank_lines {
                return Stripped::Rewritten(leading_whitespace(line).to_string());
            }
            return Stripped::Removed;
        }

        Stripped::Rewritten(result.to_string())
    }

    /// `Some(text)` when at least one comment was cut, `None` when nothing
    /// matched or a preserve pattern vetoed the line.
    fn remove_comments(&self, line: &str) -> Option<String> {
        let mut result = line.to_string();
        let mut changed = false;

        if self.options.mode != StripMode::BlockOnly {
            for marker in [self.rule.line, self.rule.alt_line] {
                if let Some(idx) = find_marker(&result, marker) {
                    if self.preserve.matches(&result[idx..]) {
                        return None;
                    }
                    result.truncate(idx);
                    changed = true;
                    break;
                }
            }
        }

        if self.options.mode != StripMode::LineOnly
            && let Some(block) = self.rule.block
        {
            while let Some(start) = find_marker(&result, block.start) {
                match find_marker(&result[start..], block.end) {
                    None => {
                        if self.preserve.matches(&result[start..]) {
                            return None;
                        }
                        result.truncate(start);
                        changed = true;
                        break;
                    }
                    Some(rel_end) => {
                        let end = start + rel_end + block.end.len();
                        if self.preserve.matches(&result[start..end]) {
                            return None;
                        }
                        result.replace_range(start..end, "");
                        changed = true;
                    }
                }
            }
        }

        changed.then_some(result)
    }
}

/// Convenience wrapper: strip one line and report whether it changed.
pub fn strip_comments(
    line: &str,
    rule: &LanguageRule,
    preserve: &PreserveRules,
    options: StripOptions,
) -> Stripped {
    LineScanner::new(rule, preserve, options).strip(line)
}

/// True if the line contains any comment marker of the rule, outside quotes.
///
/// Used to classify unchanged lines as "preserved" in previews.
pub fn line_has_comment(line: &str, rule: &LanguageRule) -> bool {
    let markers = [
        Some(rule.line),
        Some(rule.alt_line),
        rule.block.map(|b| b.start),
        rule.block.map(|b| b.end),
    ];

    markers
        .into_iter()
        .flatten()
        .any(|marker| find_marker(line, marker).is_some())
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// How one line of a file fared, for previews and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Outside the processed ranges, or processed with nothing to remove.
    Kept,
    /// Processed, unchanged, but it still carries a comment.
    Preserved,
    Modified,
    Removed,
}

/// One line of a processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    pub number: usize,
    pub original: String,
    pub stripped: Stripped,
    pub kind: LineKind,
}

/// Result of running the scanner over a whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub lines: Vec<LineOutcome>,
}

impl FileOutcome {
    pub fn is_modified(&self) -> bool {
        self.lines.iter().any(|l| l.stripped.is_changed())
    }

    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }

    pub fn changed_count(&self) -> usize {
        self.count(LineKind::Modified) + self.count(LineKind::Removed)
    }

    /// Reassemble the new file contents; every kept line ends with `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if let Some(text) = line.stripped.output(&line.original) {
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }
}

/// Run the scanner over every line of `src` that the range gate admits.
///
/// Lines outside `ranges` are passed through untouched.
pub fn strip_source(src: &str, scanner: &LineScanner<'_>, ranges: &LineRangeSet) -> FileOutcome {
    let lines = src
        .lines()
        .enumerate()
        .map(|(i, raw)| {
            let number = i + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if !ranges.should_process(number) {
                return LineOutcome {
                    number,
                    original: line.to_string(),
                    stripped: Stripped::Unchanged,
                    kind: LineKind::Kept,
                };
            }

            let stripped = scanner.strip(line);
            let kind = match &stripped {
                Stripped::Removed => LineKind::Removed,
                Stripped::Rewritten(_) => LineKind::Modified,
                Stripped::Unchanged if line_has_comment(line, scanner.rule) => LineKind::Preserved,
                Stripped::Unchanged => LineKind::Kept,
            };

            LineOutcome {
                number,
                original: line.to_string(),
                stripped,
                kind,
            }
        })
        .collect();

    FileOutcome { lines }
}
