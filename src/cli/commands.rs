//! CLI command implementations
//!
//! Every command resolves the configuration first, then the protocol
//! registry (built-ins plus `schema_dir`), then does its work against
//! stdin/stdout.
//!
//! Output is wrapped in `{"status":"ok","data":...}`, except for
//! `minimize`: it writes the bare container so that its output is valid
//! `maximize` input (`oem-minimize minimize ... | oem-minimize maximize ...`).

use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::container;
use crate::minimize::{Maximized, Maximizer, Minimizer};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{verify_evolution, ProtocolDeclaration, SchemaLoader, SchemaTree};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_bytes, read_document, write_raw, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command against the process stdin/stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(cmd, &mut stdin.lock(), &mut stdout.lock())
}

/// Run a command against the given input and output streams
pub fn execute<R: Read, W: Write>(cmd: Command, input: &mut R, output: &mut W) -> CliResult<()> {
    match cmd {
        Command::Minimize { protocol, config } => {
            minimize(config.as_deref(), &protocol, input, output)
        }
        Command::Maximize { protocol, config } => {
            maximize(config.as_deref(), &protocol, input, output)
        }
        Command::Describe { protocol, config } => describe(config.as_deref(), &protocol, output),
        Command::Protocols { config } => protocols(config.as_deref(), output),
        Command::Check {
            previous,
            next,
            config,
        } => check(config.as_deref(), &previous, &next, output),
    }
}

/// Minimize one structured record
///
/// Input: a JSON object. Output: the compact container, one line.
pub fn minimize<R: Read, W: Write>(
    config_path: Option<&Path>,
    protocol: &str,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    let registry = load_registry(&Config::resolve(config_path)?)?;
    let tree = lookup(&registry, protocol)?;

    let value = read_document(input)?;
    let record = value
        .as_object()
        .ok_or_else(|| CliError::io_error("Input must be a JSON object"))?;

    let document = Minimizer::new(tree).minimize(record)?;
    write_raw(output, &container::encode(&document)?)
}

/// Maximize one compact container
///
/// Output: `{version, record, mismatches, unknown_keys}`. Lossy decodes
/// still succeed; what was dropped is listed next to the record.
pub fn maximize<R: Read, W: Write>(
    config_path: Option<&Path>,
    protocol: &str,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    let registry = load_registry(&Config::resolve(config_path)?)?;
    let tree = lookup(&registry, protocol)?;

    let document = container::decode(&read_bytes(input)?)?;
    let result = Maximizer::new(tree).maximize(&document);
    write_response(output, maximized_to_json(result))
}

/// Print the scopes, key codes and mounts of a protocol
pub fn describe<W: Write>(
    config_path: Option<&Path>,
    protocol: &str,
    output: &mut W,
) -> CliResult<()> {
    let registry = load_registry(&Config::resolve(config_path)?)?;
    let tree = lookup(&registry, protocol)?;
    write_response(output, tree.describe())
}

/// List registered protocols
pub fn protocols<W: Write>(config_path: Option<&Path>, output: &mut W) -> CliResult<()> {
    let registry = load_registry(&Config::resolve(config_path)?)?;
    let names: Vec<&str> = registry.names().collect();
    write_response(output, json!(names))
}

/// Check that `next` only extends `previous`
pub fn check<W: Write>(
    config_path: Option<&Path>,
    previous: &Path,
    next: &Path,
    output: &mut W,
) -> CliResult<()> {
    Config::resolve(config_path)?;

    let previous = ProtocolDeclaration::from_file(previous)?.build()?;
    let next = ProtocolDeclaration::from_file(next)?.build()?;
    verify_evolution(&previous, &next)?;

    write_response(
        output,
        json!({
            "protocol": next.name(),
            "previous_version": previous.version(),
            "next_version": next.version(),
        }),
    )
}

/// Built-in protocols plus every declaration in `schema_dir`
fn load_registry(config: &Config) -> CliResult<SchemaLoader> {
    let mut registry = SchemaLoader::with_builtin()?;
    let loaded = match config.schema_path() {
        Some(dir) => registry.load_dir(dir)?,
        None => 0,
    };

    let count = registry.protocol_count().to_string();
    let loaded = loaded.to_string();
    log_event_with_fields(
        Event::ProtocolsLoaded,
        &[("count", count.as_str()), ("from_schema_dir", loaded.as_str())],
    );
    Ok(registry)
}

fn lookup<'r>(registry: &'r SchemaLoader, protocol: &str) -> CliResult<&'r SchemaTree> {
    registry
        .get(protocol)
        .ok_or_else(|| CliError::unknown_protocol(protocol))
}

fn maximized_to_json(result: Maximized) -> Value {
    let mismatches: Vec<Value> = result
        .mismatches
        .iter()
        .map(|mismatch| {
            let mut entry = json!({
                "code": mismatch.code().code(),
                "scope": mismatch.scope(),
            });
            if let Some(details) = mismatch.details() {
                entry["field"] = json!(details.field);
                entry["expected"] = json!(details.expected);
                entry["actual"] = json!(details.actual);
            }
            entry
        })
        .collect();

    json!({
        "version": result.version,
        "record": Value::Object(result.record),
        "mismatches": mismatches,
        "unknown_keys": result.unknown_keys,
    })
}
