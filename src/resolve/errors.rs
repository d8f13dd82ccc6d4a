use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "line reference {reference} not found in {} (the file changed since it was read); re-read the file to get fresh references",
        path.display()
    )]
    StaleReference { path: PathBuf, reference: String },

    #[error("invalid range: end line {end} is before start line {start}")]
    InvalidRange { start: usize, end: usize },

    #[error(
        "{} has line references; edit it with startHash/endHash/afterHash instead of quoting oldString",
        path.display()
    )]
    MandatoryReferenceUsage { path: PathBuf },

    #[error("invalid line reference '{input}': expected <line>:<3 hex chars>")]
    InvalidReference { input: String },

    #[error("malformed edit: {message}")]
    MalformedEdit { message: String },
}

impl ResolveError {
    /// Whether the caller should re-read the file before retrying.
    pub fn needs_reread(&self) -> bool {
        matches!(self, ResolveError::StaleReference { .. })
    }
}
