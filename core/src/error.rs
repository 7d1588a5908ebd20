//! Error types for argument registration, parsing, and manifest loading.
//!
//! User-input failures are values of [`ParseError`]; they never panic. The
//! only panics in this crate come from the typed getters on
//! [`ArgParser`](crate::ArgParser) when asked for a name that was never
//! registered, which is a caller bug rather than bad input.

use thiserror::Error;

/// Integer coercion failures.
///
/// Kept distinct so diagnostics can tell "not a number" apart from
/// "does not fit".
///
/// # Examples
///
/// ```
/// use argparse_core::{ArgValue, CoercionError};
///
/// assert_eq!(i32::coerce("abc"), Err(CoercionError::NotANumber));
/// assert_eq!(i32::coerce("99999999999"), Err(CoercionError::OutOfRange));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// The raw value is not a whole-string integer literal.
    #[error("not a number")]
    NotANumber,
    /// The literal is numeric but does not fit the integer width.
    #[error("numeric overflow")]
    OutOfRange,
}

/// Failures reported by [`ArgParser::try_parse`](crate::ArgParser::try_parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A canonical name or short key is registered more than once.
    #[error("argument name coincidence: {0} is registered more than once")]
    NameCoincidence(String),

    /// The token matched no registered argument and no positional target.
    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    /// A value argument appeared last with no inline value and no default.
    #[error("missing value for non-default argument: {0}")]
    MissingValue(String),

    /// `--flag=value` was supplied for a presence-only flag.
    #[error("flag does not take a value: {0}")]
    FlagTakesNoValue(String),

    /// An integer argument received a non-numeric literal.
    #[error("invalid value for {name}: '{value}' is not a number")]
    NotANumber { name: String, value: String },

    /// An integer argument received a literal outside the integer range.
    #[error("invalid value for {name}: '{value}' is out of range")]
    OutOfRange { name: String, value: String },

    /// Arguments without a default that never received a value.
    #[error("missing required argument(s): {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// A multi-value argument received fewer values than its minimum.
    #[error("argument {name} expects at least {min} value(s), got {got}")]
    TooFewValues { name: String, min: usize, got: usize },

    /// External storage was borrowed by the caller while the parser wrote to it.
    #[error("storage bound to {0} is borrowed elsewhere")]
    StorageBusy(String),
}

impl ParseError {
    /// Builds the coercion variant for `name` from a [`CoercionError`].
    pub(crate) fn coercion(name: &str, value: &str, err: CoercionError) -> Self {
        match err {
            CoercionError::NotANumber => Self::NotANumber {
                name: name.to_string(),
                value: value.to_string(),
            },
            CoercionError::OutOfRange => Self::OutOfRange {
                name: name.to_string(),
                value: value.to_string(),
            },
        }
    }
}

/// Errors raised while loading a [`ParserManifest`](crate::ParserManifest).
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `default` whose type does not match the argument kind.
    #[error("default for {name} must be {expected}")]
    DefaultMismatch { name: String, expected: &'static str },

    /// `multi`/`positional` requested on a flag.
    #[error("{name}: flags cannot be {what}")]
    InvalidFlagOption { name: String, what: &'static str },
}

/// Convenience alias for parse results.
pub type Result<T> = std::result::Result<T, ParseError>;
