use thiserror::Error;

/// Failures the library surfaces to its callers.
///
/// "No comment found" and malformed diff headers are not errors; they are
/// ordinary return values of the scanner and the diff parser.
#[derive(Debug, Error)]
pub enum ShushError {
    #[error("no file extension found")]
    NoExtension,

    #[error("unsupported file extension: {ext}")]
    UnsupportedExtension { ext: String },

    #[error("{path} is not valid UTF-8; left untouched")]
    NotUtf8 { path: String },

    #[error("not in a git repository. Use without git flags to process files normally")]
    NotARepository,

    #[error("git {args} failed: {message}")]
    GitCommand { args: String, message: String },

    #[error("shush hook already installed at {path}")]
    HookAlreadyInstalled { path: String },

    #[error("shush hook not found at {path}")]
    HookNotFound { path: String },
}
