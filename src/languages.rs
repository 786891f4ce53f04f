use std::path::Path;

use crate::error::ShushError;

/// A block comment delimiter pair, e.g. `/*` and `*/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarkers {
    pub start: &'static str,
    pub end: &'static str,
}

/// Comment syntax for one file extension.
///
/// Empty marker strings mean "this language has no such marker".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageRule {
    pub line: &'static str,
    pub alt_line: &'static str,
    pub block: Option<BlockMarkers>,
}

const C_BLOCK: BlockMarkers = BlockMarkers {
    start: "/*",
    end: "*/",
};

const MARKUP_BLOCK: BlockMarkers = BlockMarkers {
    start: "<!--",
    end: "-->",
};

const fn line_only(marker: &'static str) -> LanguageRule {
    LanguageRule {
        line: marker,
        alt_line: "",
        block: None,
    }
}

const fn with_block(marker: &'static str, block: BlockMarkers) -> LanguageRule {
    LanguageRule {
        line: marker,
        alt_line: "",
        block: Some(block),
    }
}

/// Look up the comment rule for a bare extension (no leading dot).
///
/// Matching is case-insensitive. A leading dot is tolerated and stripped.
pub fn detect_language(ext: &str) -> Result<LanguageRule, ShushError> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        return Err(ShushError::NoExtension);
    }

    rule_for(&ext).ok_or(ShushError::UnsupportedExtension { ext })
}

/// Look up the comment rule for a path, based on its extension.
pub fn language_for_path(path: &Path) -> Result<LanguageRule, ShushError> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => detect_language(ext),
        None => Err(ShushError::NoExtension),
    }
}

/// True when the path has an extension present in the rule table.
pub fn is_supported_path(path: &Path) -> bool {
    language_for_path(path).is_ok()
}

fn rule_for(ext: &str) -> Option<LanguageRule> {
    let rule = match ext {
        "lua" => line_only("--"),
        "py" | "sh" | "bash" | "zsh" | "fish" | "ps1" | "r" => line_only("#"),

        "js" | "ts" | "jsx" | "tsx" | "go" | "c" | "cpp" | "cc" | "cxx" | "h" | "hpp" | "java"
        | "cs" | "rs" | "swift" | "kt" | "kts" | "dart" | "scala" | "php" => {
            with_block("//", C_BLOCK)
        }

        "css" => with_block("", C_BLOCK),
        "scss" | "sass" | "less" => with_block("//", C_BLOCK),

        "html" | "htm" | "xml" | "svg" => with_block("", MARKUP_BLOCK),

        "rb" | "pl" | "yml" | "yaml" | "toml" | "conf" | "cfg" | "dockerfile" | "makefile" => {
            line_only("#")
        }
        "ini" => LanguageRule {
            line: "#",
            alt_line: ";",
            block: None,
        },

        "sql" => with_block("--", C_BLOCK),

        _ => return None,
    };

    Some(rule)
}

/// Human-readable language name for an extension, falling back to the
/// lowercased extension itself.
pub fn language_name(ext: &str) -> String {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();

    let name = match ext.as_str() {
        "lua" => "Lua",
        "py" => "Python",
        "sh" => "Shell",
        "bash" => "Bash",
        "zsh" => "Zsh",
        "fish" => "Fish",
        "ps1" => "PowerShell",
        "r" => "R",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "jsx" => "JSX",
        "tsx" => "TSX",
        "go" => "Go",
        "c" => "C",
        "cpp" | "cc" | "cxx" => "C++",
        "h" => "C Header",
        "hpp" => "C++ Header",
        "java" => "Java",
        "cs" => "C#",
        "rs" => "Rust",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "kts" => "Kotlin Script",
        "dart" => "Dart",
        "scala" => "Scala",
        "php" => "PHP",
        "css" => "CSS",
        "scss" => "SCSS",
        "sass" => "Sass",
        "less" => "Less",
        "html" | "htm" => "HTML",
        "xml" => "XML",
        "svg" => "SVG",
        "rb" => "Ruby",
        "pl" => "Perl",
        "yml" | "yaml" => "YAML",
        "toml" => "TOML",
        "ini" => "INI",
        "conf" | "cfg" => "Config",
        "sql" => "SQL",
        "dockerfile" => "Dockerfile",
        "makefile" => "Makefile",
        _ => return ext,
    };

    name.to_string()
}

/// Display name for the extension of `path`.
pub fn language_name_for_path(path: &Path) -> String {
    language_name(path.extension().and_then(|s| s.to_str()).unwrap_or(""))
}

/// One-line description of the markers a rule uses, for verbose output.
pub fn describe_rule(rule: &LanguageRule) -> String {
    let mut parts = Vec::new();
    if !rule.line.is_empty() {
        parts.push(format!("line ({})", rule.line));
    }
    if !rule.alt_line.is_empty() {
        parts.push(format!("line ({})", rule.alt_line));
    }
    if let Some(block) = rule.block {
        parts.push(format!("block ({} {})", block.start, block.end));
    }
    parts.join(", ")
}
