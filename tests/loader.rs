//! Schema File Tests
//!
//! Tests for loading schemas from disk:
//! - Imports resolve relative to the importing file
//! - Multi-file schemas compile like a single text
//! - Errors name the file they come from
//! - `molc` commands driven by a config file

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::sample_transaction;
use molecule_codec::cli::{self, Command, SchemaSource};
use molecule_codec::schema::SchemaErrorCode;
use molecule_codec::{Compiler, SchemaLoader, BLOCKCHAIN_SCHEMA};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

fn file_name(path: Option<&Path>) -> Option<&str> {
    path.and_then(Path::file_name).and_then(|name| name.to_str())
}

/// Splits the blockchain schema over three files
fn write_split_schema(dir: &Path) -> PathBuf {
    write(
        dir,
        "types/basic.mol",
        "array Uint32 [byte; 4];
         array Uint64 [byte; 8];
         array Byte32 [byte; 32];
         vector Bytes <byte>;",
    );
    write(
        dir,
        "types/script.mol",
        "import \"basic\";
         table Script { code_hash: Byte32, hash_type: byte, args: Bytes }
         option ScriptOpt (Script);",
    );
    write(
        dir,
        "main.mol",
        "import \"types/basic\";
         import \"types/script.mol\";
         struct OutPoint { tx_hash: Byte32, index: Uint32 }
         table CellOutput { capacity: Uint64, lock: Script, type_: ScriptOpt }",
    )
}

// =============================================================================
// Loading
// =============================================================================

/// A shared import is loaded once and declarations keep load order.
#[test]
fn test_split_schema_loads_once() {
    let dir = TempDir::new().unwrap();
    let main = write_split_schema(dir.path());

    let mut loader = SchemaLoader::new();
    loader.load_file(&main).unwrap();
    assert_eq!(loader.files().len(), 3);

    let names: Vec<&str> = loader.schema().names().collect();
    assert_eq!(
        names,
        [
            "Uint32",
            "Uint64",
            "Byte32",
            "Bytes",
            "Script",
            "ScriptOpt",
            "OutPoint",
            "CellOutput"
        ]
    );
}

/// A file schema compiles to the same encodings as inline text.
#[test]
fn test_file_and_text_agree() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "blockchain.mol", BLOCKCHAIN_SCHEMA);

    let from_file = Compiler::new().compile_file(&path).unwrap();
    let from_text = Compiler::new().compile_str(BLOCKCHAIN_SCHEMA).unwrap();

    let tx = sample_transaction();
    assert_eq!(
        from_file.codec("Transaction").unwrap().pack(&tx).unwrap(),
        from_text.codec("Transaction").unwrap().pack(&tx).unwrap()
    );
}

/// Files importing each other do not loop.
#[test]
fn test_circular_imports() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.mol", "import \"b\"; array A [byte; 1];");
    let b = write(dir.path(), "b.mol", "import \"a\"; struct B { a: A }");

    let table = Compiler::new().compile_file(&b).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.codec("B").unwrap().byte_length(), Some(1));
}

// =============================================================================
// Errors
// =============================================================================

/// A name declared in two files is a duplicate.
#[test]
fn test_duplicate_across_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.mol", "array Hash [byte; 32];");
    let two = write(dir.path(), "two.mol", "import \"one\";\narray Hash [byte; 20];");

    let err = SchemaLoader::load(&two).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DuplicateName);
    assert_eq!(file_name(err.file()), Some("two.mol"));
}

/// A syntax error in an imported file names that file and position.
#[test]
fn test_parse_error_in_import() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.mol", "\ntable T { a: byte");
    let main = write(dir.path(), "main.mol", "import \"broken\";");

    let err = SchemaLoader::load(&main).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::ParseError);
    assert_eq!(file_name(err.file()), Some("broken.mol"));
    assert_eq!(err.location().map(|l| l.line), Some(2));
}

/// A missing import is an I/O error.
#[test]
fn test_missing_import() {
    let dir = TempDir::new().unwrap();
    let main = write(dir.path(), "main.mol", "import \"nowhere\";");

    let err = Compiler::new().compile_file(&main).unwrap_err();
    assert_eq!(err.code(), "MOL_SCHEMA_IO_ERROR");
}

// =============================================================================
// Command Line
// =============================================================================

/// Commands resolve the schema through a config file.
#[test]
fn test_commands_with_config() {
    let dir = TempDir::new().unwrap();
    write_split_schema(dir.path());
    let config = write(
        dir.path(),
        "molc.json",
        r#"{"schema_file": "main.mol", "log_level": "error"}"#,
    );
    let source = SchemaSource {
        config: Some(config),
        schema: None,
    };

    let data = cli::check(&source).unwrap();
    assert_eq!(data["types"], 8);

    let layout = cli::layout(&source, Some("OutPoint")).unwrap();
    assert_eq!(layout["byte_length"], 36);

    let out_point = format!("0x{}01000000", "00".repeat(32));
    let verified = cli::verify(&source, "OutPoint", &out_point, false).unwrap();
    assert_eq!(verified["bytes"], 36);

    let err = cli::verify(&source, "OutPoint", "00", false).unwrap_err();
    assert_eq!(err.code_str(), "MOL_CODEC_LENGTH_MISMATCH");
}

/// `run_command` reports failure after writing its error object.
#[test]
fn test_run_command_propagates_failure() {
    let dir = TempDir::new().unwrap();
    let schema = write(dir.path(), "bad.mol", "struct S { a: Missing }");
    let command = Command::Check {
        source: SchemaSource {
            config: None,
            schema: Some(schema),
        },
    };
    let err = cli::run_command(command).unwrap_err();
    assert_eq!(err.code_str(), "MOL_SCHEMA_UNKNOWN_TYPE");
}
