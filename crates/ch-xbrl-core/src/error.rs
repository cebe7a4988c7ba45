use thiserror::Error;

/// Errors surfaced by [`crate::extract`].
///
/// A single bad filing must never abort a batch — callers are expected to
/// catch one of these per filing and keep going (see the crate-level docs).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The XBRL bytes could not be parsed as XML, even after BOM/prefix
    /// stripping and lossy UTF-8 recovery.
    #[error("malformed XBRL document: {0}")]
    MalformedInput(String),

    /// The filename did not match the `Prod<n>_<n>_<company>_<date>.<ext>`
    /// grammar, so the core attributes can't be assembled.
    #[error("unrecognized filename: {0}")]
    UnrecognizedFilename(String),
}

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
