//! Declarative parser definitions loaded from YAML or JSON.
//!
//! A manifest describes the same registrations the builder API performs, so a
//! parser can be configured without recompiling.
//!
//! # Example YAML
//!
//! ```yaml
//! program: accumulate
//! description: Program accumulate arguments
//! arguments:
//!   - name: --N
//!     kind: int
//!     multi: 1
//!     positional: true
//!   - name: --sum
//!     short: -s
//!     kind: flag
//!     description: add args
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ManifestError;
use crate::parser::ArgParser;
use crate::value::ArgKind;

type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// A default value as written in the manifest.
///
/// Checked against the argument's `kind` when the parser is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// One argument entry of a [`ParserManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentManifest {
    /// Canonical name; a missing `--` prefix is added.
    pub name: String,
    /// Optional short key; a missing `-` prefix is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Value category.
    pub kind: ArgKind,
    /// Help description.
    #[serde(default)]
    pub description: String,
    /// Minimum count for a multi-value argument; absent means single-valued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi: Option<usize>,
    /// Consumes bare tokens of its kind.
    #[serde(default)]
    pub positional: bool,
    /// Fallback value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

/// A complete parser definition.
///
/// # Examples
///
/// ```
/// use argparse_core::ParserManifest;
///
/// let manifest = ParserManifest::from_yaml_str(
///     "program: demo\narguments:\n  - name: count\n    short: c\n    kind: int\n    default: 3\n",
/// )
/// .unwrap();
/// let mut parser = manifest.build().unwrap();
///
/// assert!(parser.parse(["demo"]));
/// assert_eq!(parser.get_int_value("--count"), 3);
/// assert!(parser.parse(["demo", "-c", "9"]));
/// assert_eq!(parser.get_int_value("--count"), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserManifest {
    /// Program name shown on the first help line.
    pub program: String,
    /// Program description shown under the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arguments in registration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentManifest>,
}

impl ParserManifest {
    /// Loads a manifest from a YAML file.
    ///
    /// YAML is a superset of JSON, so `.json` manifests load here as well.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// read, or [`YamlError`](ManifestError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let manifest: Self = serde_yaml::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            arguments = manifest.arguments.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parses a manifest from YAML text.
    pub fn from_yaml_str(text: &str) -> ManifestResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a manifest from JSON text.
    pub fn from_json_str(text: &str) -> ManifestResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Registers every argument on a fresh [`ArgParser`].
    ///
    /// Name coincidences are not rejected here; they surface on the first
    /// parse like they do for hand-built parsers.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DefaultMismatch`] when a default does not fit
    /// the argument kind, and [`ManifestError::InvalidFlagOption`] when a flag
    /// asks to be multi-valued or positional.
    pub fn build(&self) -> ManifestResult<ArgParser> {
        let mut parser = ArgParser::new(self.program.as_str());
        if let Some(description) = &self.description {
            parser.add_help(description);
        }
        for argument in &self.arguments {
            argument.register(&mut parser)?;
        }
        Ok(parser)
    }
}

impl ArgumentManifest {
    fn register(&self, parser: &mut ArgParser) -> ManifestResult<()> {
        let short = self.short.as_deref();
        let name = self.name.as_str();
        let description = self.description.as_str();

        match self.kind {
            ArgKind::Flag => {
                if self.multi.is_some() {
                    return Err(self.invalid_flag_option("multi-valued"));
                }
                if self.positional {
                    return Err(self.invalid_flag_option("positional"));
                }
                let builder = match short {
                    Some(short) => parser.add_flag_with_short(short, name, description),
                    None => parser.add_flag(name, description),
                };
                if let Some(default) = &self.default {
                    let DefaultValue::Bool(value) = default else {
                        return Err(self.mismatch("a boolean"));
                    };
                    builder.default(*value);
                }
            }
            ArgKind::Int => {
                let default = match &self.default {
                    None => None,
                    Some(DefaultValue::Int(value)) => {
                        Some(i32::try_from(*value).map_err(|_| self.mismatch("a 32-bit integer"))?)
                    }
                    Some(_) => return Err(self.mismatch("an integer")),
                };
                let mut builder = match short {
                    Some(short) => parser.add_int_argument_with_short(short, name, description),
                    None => parser.add_int_argument(name, description),
                };
                if let Some(min_count) = self.multi {
                    builder = builder.multi_value(min_count);
                }
                if self.positional {
                    builder = builder.positional();
                }
                if let Some(value) = default {
                    builder.default(value);
                }
            }
            ArgKind::String => {
                let default = match &self.default {
                    None => None,
                    Some(DefaultValue::Text(value)) => Some(value.clone()),
                    Some(_) => return Err(self.mismatch("a string")),
                };
                let mut builder = match short {
                    Some(short) => parser.add_string_argument_with_short(short, name, description),
                    None => parser.add_string_argument(name, description),
                };
                if let Some(min_count) = self.multi {
                    builder = builder.multi_value(min_count);
                }
                if self.positional {
                    builder = builder.positional();
                }
                if let Some(value) = default {
                    builder.default(value);
                }
            }
        }
        Ok(())
    }

    fn mismatch(&self, expected: &'static str) -> ManifestError {
        ManifestError::DefaultMismatch {
            name: self.name.clone(),
            expected,
        }
    }

    fn invalid_flag_option(&self, what: &'static str) -> ManifestError {
        ManifestError::InvalidFlagOption {
            name: self.name.clone(),
            what,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ACCUMULATE_YAML: &str = "\
program: accumulate
description: Program accumulate arguments
arguments:
  - name: --N
    kind: int
    multi: 1
    positional: true
  - name: --sum
    short: -s
    kind: flag
    description: add args
  - name: --mult
    short: m
    kind: flag
    description: multiply args
";

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ACCUMULATE_YAML.as_bytes()).unwrap();

        let manifest = ParserManifest::load(file.path()).unwrap();
        assert_eq!(manifest.program, "accumulate");
        assert_eq!(manifest.arguments.len(), 3);
        assert_eq!(manifest.arguments[0].multi, Some(1));
        assert!(manifest.arguments[0].positional);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ParserManifest::load(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ManifestError::IoError(_))));
    }

    #[test]
    fn test_built_parser_behaves_like_builder() {
        let mut parser = ParserManifest::from_yaml_str(ACCUMULATE_YAML)
            .unwrap()
            .build()
            .unwrap();

        assert!(parser.parse(["accumulate", "1", "2", "3", "-m"]));
        assert!(parser.get_flag("--mult"));
        assert!(!parser.get_flag("--sum"));
        assert_eq!(parser.get_int_values("--N"), vec![1, 2, 3]);
        assert_eq!(
            parser.help_description().lines().nth(1),
            Some("Program accumulate arguments")
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "program": "tool",
            "arguments": [
                {"name": "--name", "kind": "string", "default": "anon"},
                {"name": "--level", "kind": "int", "default": -2}
            ]
        }"#;
        let mut parser = ParserManifest::from_json_str(json).unwrap().build().unwrap();
        assert!(parser.parse(["tool"]));
        assert_eq!(parser.get_string_value("--name"), "anon");
        assert_eq!(parser.get_int_value("--level"), -2);
    }

    #[test]
    fn test_default_kind_mismatch() {
        let yaml = "program: p\narguments:\n  - name: --n\n    kind: int\n    default: five\n";
        let err = ParserManifest::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::DefaultMismatch { ref name, expected: "an integer" } if name == "--n"
        ));
    }

    #[test]
    fn test_default_out_of_int_range() {
        let yaml = "program: p\narguments:\n  - name: --n\n    kind: int\n    \
                    default: 4294967296\n";
        let err = ParserManifest::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            ManifestError::DefaultMismatch { expected: "a 32-bit integer", .. }
        ));
    }

    #[test]
    fn test_flag_cannot_be_positional() {
        let yaml = "program: p\narguments:\n  - name: --v\n    kind: flag\n    positional: true\n";
        let err = ParserManifest::from_yaml_str(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, ManifestError::InvalidFlagOption { what: "positional", .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "program: p\narguments:\n  - name: --v\n    kind: flag\n    required: true\n";
        assert!(matches!(
            ParserManifest::from_yaml_str(yaml),
            Err(ManifestError::YamlError(_))
        ));
    }

    #[test]
    fn test_serializes_back_to_yaml() {
        let manifest = ParserManifest::from_yaml_str(ACCUMULATE_YAML).unwrap();
        let text = serde_yaml::to_string(&manifest).unwrap();
        assert_eq!(ParserManifest::from_yaml_str(&text).unwrap(), manifest);
    }
}
