//! CLI command implementations
//!
//! Each command resolves its configuration, compiles the schema and returns
//! a JSON payload. `run_command` turns the outcome into exactly one JSON
//! object on stdout.

use serde_json::{json, Value};

use super::args::{Cli, Command, SchemaSource};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};
use crate::codec::{Codec, UnpackOptions};
use crate::compiler::{CodecTable, Compiler};
use crate::observability::{log_event_with_fields, Event, Logger};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a command and write its JSON response
pub fn run_command(command: Command) -> CliResult<()> {
    let result = match command {
        Command::Check { source } => check(&source),
        Command::Layout { source, type_name } => layout(&source, type_name.as_deref()),
        Command::Verify {
            source,
            type_name,
            hex,
            compatible,
        } => verify(&source, &type_name, &hex, compatible),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Load config, apply its log level and compile the schema
fn prepare(source: &SchemaSource) -> CliResult<(Config, CodecTable)> {
    let config = Config::resolve(source)?;
    Logger::set_min_severity(config.severity()?);
    let table = Compiler::with_options(config.compiler_options()).compile_file(&config.schema_file)?;
    Ok((config, table))
}

/// `molc check`
pub fn check(source: &SchemaSource) -> CliResult<Value> {
    let (config, table) = prepare(source)?;
    Ok(json!({
        "schema": config.schema_file.display().to_string(),
        "types": table.len(),
    }))
}

/// `molc layout`
pub fn layout(source: &SchemaSource, type_name: Option<&str>) -> CliResult<Value> {
    let (_, table) = prepare(source)?;
    match type_name {
        Some(name) => Ok(layout_entry(name, table.codec(name)?)),
        None => Ok(Value::Array(
            table
                .iter()
                .map(|(name, codec)| layout_entry(name, codec))
                .collect(),
        )),
    }
}

fn layout_entry(name: &str, codec: &Codec) -> Value {
    json!({
        "name": name,
        "kind": codec.kind_name(),
        "fixed": codec.is_fixed(),
        "byte_length": codec.byte_length(),
        "members": codec.member_names(),
    })
}

/// `molc verify`
///
/// `--compatible` enables compatible mode; otherwise the config decides.
pub fn verify(
    source: &SchemaSource,
    type_name: &str,
    hex_input: &str,
    compatible: bool,
) -> CliResult<Value> {
    let (config, table) = prepare(source)?;
    let codec = table.codec(type_name)?;
    let buf = decode_hex(hex_input)?;
    let options = UnpackOptions {
        compatible: compatible || config.compatible,
    };

    let length = buf.len().to_string();
    match codec.verify(&buf, options) {
        Ok(()) => {
            log_event_with_fields(
                Event::BufferVerified,
                &[("type", type_name), ("bytes", length.as_str())],
            );
            Ok(json!({
                "type": type_name,
                "bytes": buf.len(),
                "compatible": options.compatible,
            }))
        }
        Err(e) => {
            let path = e.path();
            log_event_with_fields(
                Event::BufferRejected,
                &[
                    ("type", type_name),
                    ("bytes", length.as_str()),
                    ("code", e.code().code()),
                    ("path", path.as_str()),
                ],
            );
            Err(CliError::from(e))
        }
    }
}

/// Decodes a hex buffer, accepting an optional `0x` prefix and surrounding whitespace
pub fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(hex::decode(digits)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const SCHEMA: &str = "
        array Uint32 [byte; 4];
        vector Bytes <byte>;
        table Pair { a: Uint32, b: Bytes }
    ";

    fn schema_source(dir: &Path) -> SchemaSource {
        let path = dir.join("pair.mol");
        fs::write(&path, SCHEMA).unwrap();
        SchemaSource {
            config: None,
            schema: Some(path),
        }
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x0a0b").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(decode_hex(" 0A0B\n").unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0xabc").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn test_check_reports_type_count() {
        let dir = TempDir::new().unwrap();
        let data = check(&schema_source(dir.path())).unwrap();
        assert_eq!(data["types"], 3);
    }

    #[test]
    fn test_layout() {
        let dir = TempDir::new().unwrap();
        let source = schema_source(dir.path());

        let all = layout(&source, None).unwrap();
        assert_eq!(all.as_array().map(Vec::len), Some(3));

        let pair = layout(&source, Some("Pair")).unwrap();
        assert_eq!(pair["kind"], "table");
        assert_eq!(pair["fixed"], false);
        assert_eq!(pair["byte_length"], Value::Null);
        assert_eq!(pair["members"], json!(["a", "b"]));

        let uint = layout(&source, Some("Uint32")).unwrap();
        assert_eq!(uint["byte_length"], 4);

        let err = layout(&source, Some("Missing")).unwrap_err();
        assert_eq!(err.code_str(), "MOL_COMPILE_UNKNOWN_CODEC");
    }

    #[test]
    fn test_verify() {
        let dir = TempDir::new().unwrap();
        let source = schema_source(dir.path());
        // a = 1, b = [0xff]
        let good = "0x150000000c000000100000000100000001000000ff";
        let data = verify(&source, "Pair", good, false).unwrap();
        assert_eq!(data["bytes"], 21);
        assert_eq!(data["compatible"], false);

        let err = verify(&source, "Pair", "0x04000000", false).unwrap_err();
        assert_eq!(err.code_str(), "MOL_CODEC_INVALID_LAYOUT");

        let err = verify(&source, "Pair", "0x1500", false).unwrap_err();
        assert_eq!(err.code_str(), "MOL_CODEC_LENGTH_MISMATCH");

        let err = verify(&source, "Pair", "0xabc", false).unwrap_err();
        assert_eq!(err.code_str(), "MOL_CLI_INVALID_INPUT");
    }

    #[test]
    fn test_verify_compatible_flag() {
        let dir = TempDir::new().unwrap();
        let source = schema_source(dir.path());
        // Pair with a trailing third field holding 0xee
        let extended = "1a0000001000000014000000190000000100000001000000ffee";

        let err = verify(&source, "Pair", extended, false).unwrap_err();
        assert_eq!(err.code_str(), "MOL_CODEC_INVALID_LAYOUT");

        let data = verify(&source, "Pair", extended, true).unwrap();
        assert_eq!(data["bytes"], 26);
        assert_eq!(data["compatible"], true);
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let err = check(&SchemaSource::default()).unwrap_err();
        assert_eq!(err.code_str(), "MOL_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_schema_errors_keep_their_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.mol");
        fs::write(&path, "struct S { a: Missing }").unwrap();
        let source = SchemaSource {
            config: None,
            schema: Some(path),
        };
        let err = check(&source).unwrap_err();
        assert_eq!(err.code_str(), "MOL_SCHEMA_UNKNOWN_TYPE");
    }
}
