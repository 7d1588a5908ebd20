//! Argument descriptions.
//!
//! An [`ArgumentSpec`] is the registration-time description of a single
//! argument: its names, description, and multiplicity. Values live
//! elsewhere, in the owning registry's [`ValueBinding`](crate::ValueBinding).

use serde::{Deserialize, Serialize};

use crate::value::ArgKind;

/// Handle returned by registration, addressing one spec inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId {
    pub(crate) kind: ArgKind,
    pub(crate) index: usize,
}

impl SpecId {
    /// Registry category this handle belongs to.
    pub fn kind(self) -> ArgKind {
        self.kind
    }
}

/// Description of one registered argument.
///
/// # Examples
///
/// ```
/// use argparse_core::{ArgKind, ArgumentSpec};
///
/// let spec = ArgumentSpec::new(ArgKind::Int, Some("c"), "count", "How many");
/// assert_eq!(spec.canonical_name, "--count");
/// assert_eq!(spec.short_key.as_deref(), Some("-c"));
/// assert!(spec.matches("-c"));
/// assert!(spec.matches("--count"));
/// assert!(!spec.matches("count"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Unique long-form identifier (e.g. `--count`).
    pub canonical_name: String,
    /// Optional alternate token (e.g. `-c`).
    pub short_key: Option<String>,
    /// Free text for help rendering.
    pub description: String,
    /// Registry category.
    pub kind: ArgKind,
    /// Consumes bare tokens not matched by name.
    pub is_positional: bool,
    /// Repeated occurrences accumulate instead of overwriting.
    pub is_multi: bool,
    /// Minimum number of supplied values for a multi-value argument.
    pub min_count: usize,
    /// A fallback value exists.
    pub has_default: bool,
    /// The default came from the caller rather than the implicit flag default.
    pub explicit_default: bool,
}

impl ArgumentSpec {
    /// Creates a spec, normalizing both names to their dashed forms.
    pub fn new(
        kind: ArgKind,
        short_key: Option<&str>,
        canonical_name: &str,
        description: &str,
    ) -> Self {
        Self {
            canonical_name: normalize_long(canonical_name),
            short_key: short_key
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(normalize_short),
            description: description.to_string(),
            kind,
            is_positional: false,
            is_multi: false,
            min_count: 0,
            has_default: false,
            explicit_default: false,
        }
    }

    /// Checks the canonical name and the short key.
    pub fn matches(&self, key: &str) -> bool {
        self.canonical_name == key || self.short_key.as_deref() == Some(key)
    }

    /// Every name this spec answers to, canonical first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_name.as_str()).chain(self.short_key.as_deref())
    }
}

/// Prefixes `--` unless the name already starts with a dash.
///
/// # Examples
///
/// ```
/// use argparse_core::normalize_long;
///
/// assert_eq!(normalize_long("param1"), "--param1");
/// assert_eq!(normalize_long("--param1"), "--param1");
/// ```
pub fn normalize_long(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else {
        format!("--{trimmed}")
    }
}

/// Prefixes `-` unless the key already starts with one.
pub fn normalize_short(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else {
        format!("-{trimmed}")
    }
}
