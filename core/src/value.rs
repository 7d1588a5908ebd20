//! Value kinds and coercion from raw command-line text.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::error::CoercionError;

/// The three argument categories a parser keeps registries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Presence-only boolean argument.
    Flag,
    /// 32-bit signed integer argument.
    Int,
    /// Free-text argument.
    String,
}

impl ArgKind {
    /// Type annotation used in help output (`None` for flags).
    pub fn type_label(self) -> Option<&'static str> {
        match self {
            Self::Flag => None,
            Self::Int => Some("int"),
            Self::String => Some("string"),
        }
    }
}

impl std::fmt::Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Flag => "flag",
            Self::Int => "int",
            Self::String => "string",
        })
    }
}

/// A value type that can live in a [`TypeRegistry`](crate::TypeRegistry).
///
/// # Examples
///
/// ```
/// use argparse_core::{ArgKind, ArgValue};
///
/// assert_eq!(i32::KIND, ArgKind::Int);
/// assert_eq!(i32::coerce("-42"), Ok(-42));
/// assert_eq!(String::coerce("text"), Ok("text".to_string()));
/// assert_eq!(true.render(), "true");
/// ```
pub trait ArgValue: Clone + Default + std::fmt::Debug + 'static {
    /// Category this type belongs to.
    const KIND: ArgKind;

    /// Converts a raw token into a value.
    fn coerce(raw: &str) -> Result<Self, CoercionError>;

    /// Display form used for defaults in help text.
    fn render(&self) -> String;
}

impl ArgValue for bool {
    const KIND: ArgKind = ArgKind::Flag;

    // Flags never consume a token; presence alone sets them.
    fn coerce(_raw: &str) -> Result<Self, CoercionError> {
        Ok(true)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for i32 {
    const KIND: ArgKind = ArgKind::Int;

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.parse::<i32>().map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoercionError::OutOfRange,
            _ => CoercionError::NotANumber,
        })
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for String {
    const KIND: ArgKind = ArgKind::String;

    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

/// Whether `token` is an integer literal, regardless of whether it fits.
///
/// The positional router uses this to prefer integer targets for numeric
/// tokens; an overflowing literal still routes to the integer target and
/// then fails coercion there.
pub fn looks_like_int(token: &str) -> bool {
    let digits = token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_coercion_is_whole_string() {
        assert_eq!(i32::coerce("100500"), Ok(100500));
        assert_eq!(i32::coerce("+7"), Ok(7));
        assert_eq!(i32::coerce("12abc"), Err(CoercionError::NotANumber));
        assert_eq!(i32::coerce(" 12"), Err(CoercionError::NotANumber));
        assert_eq!(i32::coerce(""), Err(CoercionError::NotANumber));
    }

    #[test]
    fn test_int_coercion_distinguishes_overflow() {
        assert_eq!(i32::coerce("2147483647"), Ok(i32::MAX));
        assert_eq!(i32::coerce("-2147483648"), Ok(i32::MIN));
        assert_eq!(i32::coerce("2147483648"), Err(CoercionError::OutOfRange));
        assert_eq!(i32::coerce("-2147483649"), Err(CoercionError::OutOfRange));
    }

    #[test]
    fn test_looks_like_int() {
        assert!(looks_like_int("5"));
        assert!(looks_like_int("-5"));
        assert!(looks_like_int("99999999999999999999"));
        assert!(!looks_like_int("-"));
        assert!(!looks_like_int("-ac"));
        assert!(!looks_like_int("5x"));
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(ArgKind::Flag.type_label(), None);
        assert_eq!(ArgKind::Int.type_label(), Some("int"));
        assert_eq!(ArgKind::String.type_label(), Some("string"));
    }
}
