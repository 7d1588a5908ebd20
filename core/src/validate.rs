//! Registry-wide checks run before and after token resolution.
//!
//! - [`check_coincidence`] runs before any token is looked at and rejects a
//!   canonical name or short key registered more than once, across all three
//!   registries.
//! - [`check_completeness`] runs after the last token and rejects arguments
//!   that neither received a value nor have a default.
//!
//! # Examples
//!
//! ```
//! use argparse_core::*;
//!
//! let mut registries = Registries::default();
//! registries.flags.register(None, "--param1", "");
//! assert!(check_coincidence(&registries).is_ok());
//!
//! registries.strings.register(None, "--param1", "");
//! assert_eq!(
//!     check_coincidence(&registries),
//!     Err(ParseError::NameCoincidence("--param1".to_string()))
//! );
//! ```

use std::collections::HashSet;

use crate::error::{ParseError, Result};
use crate::registry::{Registries, Shortfall};

/// Rejects duplicated canonical names and short keys.
///
/// Canonical names and short keys share one namespace, so a short key equal
/// to another argument's canonical name is also a coincidence.
pub fn check_coincidence(registries: &Registries) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for spec in registries.specs() {
        for name in spec.names() {
            if !seen.insert(name) {
                return Err(ParseError::NameCoincidence(name.to_string()));
            }
        }
    }
    Ok(())
}

/// Rejects arguments left without a value, except `exempt` (the help flag).
///
/// Missing arguments are reported together; a multi-value argument that got
/// some values but fewer than its minimum is reported on its own.
pub fn check_completeness(registries: &Registries, exempt: &str) -> Result<()> {
    let mut missing = Vec::new();
    let mut too_few = None;

    for shortfall in registries.shortfalls() {
        match shortfall {
            Shortfall::Missing(name) if name != exempt => missing.push(name),
            Shortfall::Missing(_) => {}
            Shortfall::TooFew { name, min, got } => {
                too_few.get_or_insert(ParseError::TooFewValues { name, min, got });
            }
        }
    }

    if !missing.is_empty() {
        return Err(ParseError::MissingRequired(missing));
    }
    too_few.map_or(Ok(()), Err)
}
