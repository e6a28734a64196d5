//! Schema validator
//!
//! Checks run in this order, and the first failure aborts:
//! - Field and union item names are unique within a declaration
//! - Arrays have a positive count, structs and unions are non-empty
//! - Union ids are all explicit or all positional, and never repeat
//! - Option items are never options themselves
//! - Every referenced type is `byte`, declared, or supplied externally
//! - Array items and struct fields are, recursively, fixed-size
//! - The dependency graph has no cycles
//!
//! Duplicate top-level names, including a redeclared `byte`, are rejected
//! earlier, when the schema is built.

use std::collections::{HashMap, HashSet};

use super::errors::{SchemaError, SchemaResult};
use super::types::{DeclKind, Declaration, FieldDecl, Schema, UnionItem, BYTE};

/// Validates a schema before compilation.
///
/// Validation never mutates the schema and is deterministic.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
    /// Types provided outside the schema, with their fixedness
    external: HashMap<String, bool>,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            external: HashMap::new(),
        }
    }

    /// Declares a type supplied from outside the schema.
    ///
    /// External types satisfy references and are trusted to be fixed-size
    /// when `fixed` is true. A declaration of the same name takes precedence
    /// only if no external type is registered for it.
    pub fn with_external(mut self, name: impl Into<String>, fixed: bool) -> Self {
        self.external.insert(name.into(), fixed);
        self
    }

    /// Validates the whole schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` with:
    /// - `DuplicateField` for repeated field or union item names
    /// - `InvalidDeclaration` for empty or malformed declarations
    /// - `UnknownType` for dangling references ("cannot find type")
    /// - `NotFixedLength` for variable-size types in arrays and structs
    /// - `CircularDependency` for reference cycles
    pub fn validate(&self) -> SchemaResult<()> {
        for decl in self.schema.declarations() {
            self.check_shape(decl).map_err(|e| e.at(decl.location))?;
        }
        for decl in self.schema.declarations() {
            self.check_references(decl).map_err(|e| e.at(decl.location))?;
        }

        let mut fixed = FixedMemo::default();
        for decl in self.schema.declarations() {
            let needs_fixed = matches!(decl.kind, DeclKind::Array { .. } | DeclKind::Struct { .. });
            if !needs_fixed {
                continue;
            }
            for reference in decl.references() {
                if !self.is_fixed(reference, &mut fixed)? {
                    return Err(SchemaError::not_fixed(&decl.name, reference).at(decl.location));
                }
            }
        }

        self.schema.dependency_order().map(|_| ())
    }

    fn check_shape(&self, decl: &Declaration) -> SchemaResult<()> {
        match &decl.kind {
            DeclKind::Array { count, .. } => {
                if *count == 0 {
                    return Err(SchemaError::invalid_declaration(
                        &decl.name,
                        "array item count must be greater than 0",
                    ));
                }
                Ok(())
            }
            DeclKind::Struct { fields } => {
                if fields.is_empty() {
                    return Err(SchemaError::invalid_declaration(
                        &decl.name,
                        "struct must declare at least one field",
                    ));
                }
                check_unique_fields(&decl.name, fields)
            }
            DeclKind::Table { fields } => check_unique_fields(&decl.name, fields),
            DeclKind::Union { items } => check_union_items(&decl.name, items),
            DeclKind::Option { item } => {
                let nested = self
                    .schema
                    .get(item)
                    .is_some_and(|d| matches!(d.kind, DeclKind::Option { .. }));
                if nested && !self.external.contains_key(item) {
                    return Err(SchemaError::invalid_declaration(
                        &decl.name,
                        "option item must not be an option",
                    ));
                }
                Ok(())
            }
            DeclKind::Vector { .. } => Ok(()),
        }
    }

    fn check_references(&self, decl: &Declaration) -> SchemaResult<()> {
        for reference in decl.references() {
            let known = reference == BYTE
                || self.schema.contains(reference)
                || self.external.contains_key(reference);
            if !known {
                return Err(SchemaError::unknown_type(&decl.name, reference));
            }
        }
        Ok(())
    }

    /// Memoized fixed-size closure over `array`/`struct`/`byte`.
    ///
    /// A type under evaluation counts as not fixed, so a cycle through
    /// fixed declarations terminates and is reported as not fixed.
    fn is_fixed(&self, name: &str, memo: &mut FixedMemo) -> SchemaResult<bool> {
        if name == BYTE {
            return Ok(true);
        }
        if let Some(&fixed) = self.external.get(name) {
            return Ok(fixed);
        }
        if let Some(&state) = memo.states.get(name) {
            return Ok(state == FixedState::Fixed);
        }
        let decl = match self.schema.get(name) {
            Some(decl) => decl,
            None => return Ok(false),
        };
        let result = match &decl.kind {
            DeclKind::Array { .. } | DeclKind::Struct { .. } => {
                memo.states.insert(name.to_string(), FixedState::InProgress);
                let mut all_fixed = true;
                for reference in decl.references() {
                    if !self.is_fixed(reference, memo)? {
                        all_fixed = false;
                        break;
                    }
                }
                all_fixed
            }
            _ => false,
        };
        let state = if result {
            FixedState::Fixed
        } else {
            FixedState::NotFixed
        };
        memo.states.insert(name.to_string(), state);
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixedState {
    InProgress,
    Fixed,
    NotFixed,
}

#[derive(Default)]
struct FixedMemo {
    states: HashMap<String, FixedState>,
}

fn check_unique_fields(declaration: &str, fields: &[FieldDecl]) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::duplicate_field(declaration, &field.name));
        }
    }
    Ok(())
}

fn check_union_items(declaration: &str, items: &[UnionItem]) -> SchemaResult<()> {
    if items.is_empty() {
        return Err(SchemaError::invalid_declaration(
            declaration,
            "union must declare at least one item",
        ));
    }

    let mut names = HashSet::new();
    for item in items {
        if !names.insert(item.type_name.as_str()) {
            return Err(SchemaError::duplicate_field(declaration, &item.type_name));
        }
    }

    let explicit = items.iter().filter(|i| i.id.is_some()).count();
    if explicit != 0 && explicit != items.len() {
        return Err(SchemaError::invalid_declaration(
            declaration,
            "union ids must be given for all items or for none",
        ));
    }

    let mut ids = HashSet::new();
    for id in items.iter().filter_map(|i| i.id) {
        if !ids.insert(id) {
            return Err(SchemaError::invalid_declaration(
                declaration,
                format!("duplicate union id {}", id),
            ));
        }
    }
    Ok(())
}
