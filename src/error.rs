//! Error taxonomy for parsing, addressing and value decoding.

use thiserror::Error;

/// Errors returned by the `rustyhl7` crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Hl7Error {
    /// Message text violates HL7 structure: missing MSH, malformed
    /// delimiter field, bad segment name.
    #[error("structural error: {0}")]
    Structural(String),

    /// A path referenced a segment or field that does not exist at all
    /// (distinct from existing-but-empty).
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Malformed escape sequence during decode, or a date/time value that
    /// matched a pattern but failed calendar validation.
    #[error("format error: {0}")]
    Format(String),

    /// Date/time string whose length has no registered parse pattern.
    #[error("unsupported date/time pattern: {0}")]
    UnsupportedPattern(String),
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
