//! Help text rendering.
//!
//! The help text is a projection of the registered specs:
//!
//! ```text
//! My Parser
//! Some Description about program
//!
//!     --number=<int>, Some Number
//! -i, --input=<string>, File path for input file [repeated, min args = 1]
//! -s, --flag1, Use some logic [default = true]
//!
//! -h, --help Display this help and exit
//! ```

use std::fmt::Write;

use crate::parser::ArgParser;
use crate::spec::{ArgumentSpec, SpecId};

const SHORT_PLACEHOLDER: &str = "    ";

pub(crate) fn render(parser: &ArgParser) -> String {
    let mut out = String::new();
    out.push_str(parser.program_name());
    out.push('\n');
    if let Some(description) = parser.description() {
        out.push_str(description);
        out.push('\n');
    }
    out.push('\n');

    for (id, spec) in parser.arguments() {
        let default = parser.registries().rendered_default(id);
        out.push_str(&argument_line(id, spec, default.as_deref()));
        out.push('\n');
    }

    let help = parser.help_spec();
    out.push('\n');
    let _ = writeln!(
        out,
        "{}, {} {}",
        help.short_key.as_deref().unwrap_or_default(),
        help.canonical_name,
        help.description
    );
    out
}

fn argument_line(id: SpecId, spec: &ArgumentSpec, default: Option<&str>) -> String {
    let mut line = match &spec.short_key {
        Some(short) => format!("{short}, "),
        None => SHORT_PLACEHOLDER.to_string(),
    };
    line.push_str(&spec.canonical_name);
    if let Some(label) = id.kind().type_label() {
        let _ = write!(line, "=<{label}>");
    }
    if !spec.description.is_empty() {
        let _ = write!(line, ", {}", spec.description);
    }

    let mut notes = Vec::new();
    if spec.is_multi {
        notes.push("repeated".to_string());
        if spec.min_count > 0 {
            notes.push(format!("min args = {}", spec.min_count));
        }
    }
    if let Some(default) = default {
        notes.push(format!("default = {default}"));
    }
    if spec.is_positional {
        notes.push("positional".to_string());
    }
    if !notes.is_empty() {
        let _ = write!(line, " [{}]", notes.join(", "));
    }
    line
}
