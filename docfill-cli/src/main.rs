//! Command-line interface for docfill
//! Merges JSON-encoded documents with bindings and table records, or lists the tokens a document
//! still carries.
//!
//! Usage:
//!   docfill merge `<doc.json>` [--bindings `<file>`] [--table `<file>`] [--composite `<file>`]
//!                 [--skip-header] [--config `<file>`] [--set `<key=value>`]... [--output `<file>`]
//!   docfill tokens `<doc.json>`
//!
//! Without `--config`, a `docfill.toml` in the working directory is layered over the defaults
//! when present.

use clap::{Arg, ArgAction, ArgMatches, Command};
use docfill::merge::store::{FragmentEntry, MediaEntry};
use docfill::merge::{Bindings, Document, MemoryStore};
use docfill::{MergeOptions, Merger};
use docfill_config::{DocfillConfig, Loader};
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOCAL_CONFIG: &str = "docfill.toml";

/// What `merge` writes: the filled tree plus every payload registered while filling it
#[derive(Serialize)]
struct MergeOutput<'a> {
    document: &'a Document,
    media: &'a [MediaEntry],
    fragments: &'a [FragmentEntry],
}

fn main() {
    let matches = Command::new("docfill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill {{token}} placeholders and table rows in documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("merge")
                .about("Substitute bindings and fill the first table of a document")
                .arg(
                    Arg::new("path")
                        .help("Path to the document JSON")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("bindings")
                        .long("bindings")
                        .short('b')
                        .help("JSON object mapping token names to values"),
                )
                .arg(
                    Arg::new("table")
                        .long("table")
                        .short('t')
                        .help("JSON array of records written positionally into the first table")
                        .conflicts_with("composite"),
                )
                .arg(
                    Arg::new("composite")
                        .long("composite")
                        .help("JSON array of binding objects, one template row per record"),
                )
                .arg(
                    Arg::new("skip-header")
                        .long("skip-header")
                        .help("Treat the first table row as a header")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML file layered over the built-in defaults"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .short('s')
                        .value_name("KEY=VALUE")
                        .help("Override one setting, e.g. merge.max_replacements_per_token=50")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write the result here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("List the placeholders left in a document")
                .arg(
                    Arg::new("path")
                        .help("Path to the document JSON")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("merge", sub)) => handle_merge_command(sub),
        Some(("tokens", sub)) => handle_tokens_command(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

/// Handle the merge command
fn handle_merge_command(matches: &ArgMatches) {
    let assignments: Vec<&String> = matches
        .get_many::<String>("set")
        .map(|values| values.collect())
        .unwrap_or_default();
    let config = load_config(matches.get_one::<String>("config"), &assignments);
    init_tracing(&config);

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let mut doc: Document = read_json(path);
    let skip_header = matches.get_flag("skip-header");

    let mut store = MemoryStore::new();
    let mut merger = Merger::with_options(&mut store, MergeOptions::from(&config.merge));

    // Tables go first so tokens left in replicated rows still see the document bindings
    if let Some(table) = matches.get_one::<String>("table") {
        let records = positional_records(read_json(table));
        info!(records = records.len(), "positional table fill");
        merger.fill_table(&mut doc, skip_header, &records);
    }
    if let Some(composite) = matches.get_one::<String>("composite") {
        let records = composite_records(read_json(composite));
        info!(records = records.len(), "composite table fill");
        merger
            .fill_composite_table(&mut doc, skip_header, &records)
            .unwrap_or_else(|e| fail("Composite fill error", e));
    }
    if let Some(bindings) = matches.get_one::<String>("bindings") {
        let bindings = Bindings::from_json(read_json(bindings))
            .unwrap_or_else(|e| fail("Invalid bindings", e));
        debug!(count = bindings.len(), "bindings loaded");
        merger
            .substitute_tokens(&mut doc, &bindings)
            .unwrap_or_else(|e| fail("Merge error", e));
    }

    let output = MergeOutput {
        document: &doc,
        media: &store.media,
        fragments: &store.fragments,
    };
    let serialized = match config.output.pretty {
        true => serde_json::to_string_pretty(&output),
        false => serde_json::to_string(&output),
    };
    let serialized = serialized.unwrap_or_else(|e| fail("Error formatting output", e));

    match matches.get_one::<String>("output") {
        Some(target) => fs::write(target, serialized)
            .unwrap_or_else(|e| fail(&format!("Cannot write '{}'", target), e)),
        None => println!("{}", serialized),
    }
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let doc: Document = read_json(path);

    for (name, modifier) in doc.placeholders() {
        match modifier {
            Some(modifier) => println!("{}:{}", name, modifier),
            None => println!("{}", name),
        }
    }
}

fn load_config(path: Option<&String>, assignments: &[&String]) -> DocfillConfig {
    let mut loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    for assignment in assignments {
        loader = loader
            .with_assignment(assignment)
            .unwrap_or_else(|e| fail("Invalid --set", e));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail("Configuration error", e))
}

/// `RUST_LOG` wins over the configured filter
fn init_tracing(config: &DocfillConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let source =
        fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Cannot read '{}'", path), e));
    serde_json::from_str(&source)
        .unwrap_or_else(|e| fail(&format!("Invalid JSON in '{}'", path), e))
}

/// Records for a positional fill: strings are written as-is, null as an empty cell, anything
/// else in its JSON form.
fn positional_records(rows: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn composite_records(records: Vec<serde_json::Value>) -> Vec<Bindings> {
    records
        .into_iter()
        .map(|record| Bindings::from_json(record).unwrap_or_else(|e| fail("Invalid record", e)))
        .collect()
}

fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}
