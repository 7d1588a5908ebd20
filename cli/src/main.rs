mod logging;

use std::path::{Path, PathBuf};

use argparse_core::{
    ArgKind, ArgParser, ArgumentSpec, ParseOutcome, ParserManifest, check_coincidence,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Output format for parsed values.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "argcheck")]
#[command(about = "Check and exercise declarative argument manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a manifest and check it for name coincidences.
    Validate(ManifestArgs),
    /// Print the help text a manifest produces.
    Describe(ManifestArgs),
    /// Parse tokens against a manifest and print the resulting values.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct ManifestArgs {
    /// Manifest file (YAML or JSON).
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Manifest file (YAML or JSON).
    #[arg(long)]
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse, after `--` (the program name is prepended).
    #[arg(last = true)]
    tokens: Vec<String>,
}

/// JSON document printed by `parse --format json`.
#[derive(Debug, Serialize)]
struct ParseReport {
    status: &'static str,
    values: Map<String, Value>,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_parser(path: &Path) -> Result<ArgParser, String> {
    let manifest = ParserManifest::load(path).map_err(|e| format!("{}: {e}", path.display()))?;
    manifest.build().map_err(|e| format!("{}: {e}", path.display()))
}

fn run_validate(args: ManifestArgs) -> Result<(), String> {
    let parser = load_parser(&args.manifest)?;
    check_coincidence(parser.registries()).map_err(|e| e.to_string())?;
    println!(
        "Manifest OK: {} argument(s) for {}.",
        parser.arguments().count(),
        parser.program_name()
    );
    Ok(())
}

fn run_describe(args: ManifestArgs) -> Result<(), String> {
    let parser = load_parser(&args.manifest)?;
    print!("{}", parser.help_description());
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut parser = load_parser(&args.manifest)?;
    let mut tokens = vec![parser.program_name().to_string()];
    tokens.extend(args.tokens);
    debug!(tokens = tokens.len(), "parsing manifest tokens");

    let outcome = parser.try_parse(&tokens).map_err(|e| e.to_string())?;
    if outcome == ParseOutcome::HelpRequested {
        print!("{}", parser.help_description());
        return Ok(());
    }

    let values: Vec<(String, Value)> = parser
        .arguments()
        .map(|(_, spec)| (spec.canonical_name.clone(), current_value(&parser, spec)))
        .collect();

    match args.format {
        CliOutputFormat::Json => {
            let report = ParseReport {
                status: "parsed",
                values: values.into_iter().collect(),
            };
            let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{text}");
        }
        CliOutputFormat::Text => {
            for (name, value) in &values {
                println!("{name} = {value}");
            }
        }
    }
    Ok(())
}

fn current_value(parser: &ArgParser, spec: &ArgumentSpec) -> Value {
    let name = spec.canonical_name.as_str();
    match (spec.kind, spec.is_multi) {
        (ArgKind::Flag, _) => json!(parser.get_flag(name)),
        (ArgKind::Int, false) => json!(parser.get_int_value(name)),
        (ArgKind::Int, true) => json!(parser.get_int_values(name)),
        (ArgKind::String, false) => json!(parser.get_string_value(name)),
        (ArgKind::String, true) => json!(parser.get_string_values(name)),
    }
}
