//! Declarative command-line argument parsing.
//!
//! This crate provides a small, typed argument parser:
//!
//! - [`ArgParser`]: registration façade. Arguments are added with
//!   `add_flag*`, `add_int_argument*` and `add_string_argument*`, then tuned
//!   through the returned [`ArgBuilder`] (defaults, multi-value, positional,
//!   external storage).
//! - [`TypeRegistry`]: per-type store of [`ArgumentSpec`]s and their
//!   [`ValueBinding`]s; a parser owns one per [`ArgKind`].
//! - [`resolve`]: token matching (help short-circuit, named
//!   lookup, positional fallback, short-flag clusters).
//! - [`check_coincidence`] / [`check_completeness`]: registry-wide checks
//!   run before and after resolution.
//! - [`ParserManifest`]: YAML/JSON parser definitions.
//!
//! User-input failures are reported as [`ParseError`] values.
//!
//! # Example
//!
//! ```
//! use argparse_core::*;
//!
//! let mut parser = ArgParser::new("My Parser");
//! parser.add_string_argument_with_short("-i", "--input", "File path").multi_value(1);
//! parser.add_int_argument("--level", "Verbosity").default(2);
//! parser.add_flag_with_short("-a", "--all", "");
//! parser.add_flag_with_short("-c", "--compact", "");
//!
//! assert!(parser.parse(["app", "-i", "a.txt", "--input=b.txt", "-ac"]));
//! assert_eq!(parser.get_string_values("--input"), vec!["a.txt", "b.txt"]);
//! assert_eq!(parser.get_int_value("--level"), 2);
//! assert!(parser.get_flag("--all") && parser.get_flag("--compact"));
//!
//! assert_eq!(
//!     parser.try_parse(["app", "--nope"]),
//!     Err(ParseError::UnknownArgument("--nope".to_string()))
//! );
//! ```

mod binding;
mod error;
mod help;
mod manifest;
mod parser;
mod registry;
mod resolver;
mod spec;
mod validate;
mod value;

pub use binding::{ExternalSlot, Store, ValueBinding, Values};
pub use error::{CoercionError, ManifestError, ParseError, Result};
pub use manifest::{ArgumentManifest, DefaultValue, ParserManifest};
pub use parser::{ArgBuilder, ArgParser, ParseOutcome};
pub use registry::{Registered, Registries, TypeRegistry, ValueArg};
pub use resolver::{ClusterState, HELP_LONG, HELP_SHORT, Resolution, ShortCluster, resolve};
pub use spec::{ArgumentSpec, SpecId, normalize_long, normalize_short};
pub use validate::{check_coincidence, check_completeness};
pub use value::{ArgKind, ArgValue, looks_like_int};
