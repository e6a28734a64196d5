//! Schema loader: reads schema files and resolves imports
//!
//! - `import "common/basic";` loads `common/basic.mol` relative to the
//!   importing file (an explicit extension is kept as written)
//! - Imported files are loaded before the declarations of the importer
//! - Each file is loaded at most once, so diamond and circular imports are safe
//! - Declarations from all files merge into one schema; a name declared in
//!   two files is a duplicate-name error

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::parser;
use super::types::Schema;
use crate::observability::{log_event_with_fields, Event};

/// Default extension for schema files
pub const SCHEMA_EXTENSION: &str = "mol";

/// Loads schema files into a single merged schema.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    schema: Schema,
    /// Canonical paths of files already loaded
    seen: HashSet<PathBuf>,
    /// Files in load order
    files: Vec<PathBuf>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads one file and everything it imports into a fresh schema
    pub fn load(path: &Path) -> SchemaResult<Schema> {
        let mut loader = Self::new();
        loader.load_file(path)?;
        Ok(loader.into_schema())
    }

    /// Loads `path` (and its imports) into this loader's schema.
    ///
    /// # Errors
    ///
    /// - `IoError` if a file cannot be read
    /// - `ParseError` for malformed schema text
    /// - `DuplicateName` if a name is declared twice across files
    ///
    /// Errors carry the path of the file they occurred in.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let canonical = fs::canonicalize(path).map_err(|e| SchemaError::io_error(path, e))?;
        if !self.seen.insert(canonical.clone()) {
            return Ok(());
        }

        let text = fs::read_to_string(&canonical).map_err(|e| SchemaError::io_error(path, e))?;
        let file = parser::parse(&text).map_err(|e| e.in_file(path))?;

        let base = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        for import in &file.imports {
            let import_path = resolve_import(&base, &import.path);
            self.load_file(&import_path).map_err(|e| e.in_file(path))?;
        }

        let count = file.declarations.len().to_string();
        for decl in file.declarations {
            self.schema.insert(decl).map_err(|e| e.in_file(path))?;
        }

        self.files.push(canonical);
        let shown = path.display().to_string();
        log_event_with_fields(
            Event::SchemaLoaded,
            &[("path", shown.as_str()), ("declarations", count.as_str())],
        );
        Ok(())
    }

    /// Files loaded so far, dependencies first
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }
}

fn resolve_import(base: &Path, import: &str) -> PathBuf {
    let mut path = base.join(import);
    if path.extension().is_none() {
        path.set_extension(SCHEMA_EXTENSION);
    }
    path
}
