//! Schema model: parsed declarations keyed by name
//!
//! Declarations are immutable once parsed. Type references are stored by
//! name and resolved later by the validator and the compiler.

use std::collections::HashMap;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};

/// The only built-in primitive
pub const BYTE: &str = "byte";

/// 1-based line and column in schema text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// `name: Type` inside a struct or table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A union item: the item type doubles as the variant name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionItem {
    pub type_name: String,
    /// Explicit tag; positional when absent
    pub id: Option<u32>,
}

impl UnionItem {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
        }
    }

    pub fn with_id(type_name: impl Into<String>, id: u32) -> Self {
        Self {
            type_name: type_name.into(),
            id: Some(id),
        }
    }
}

/// Declaration shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Array { item: String, count: usize },
    Struct { fields: Vec<FieldDecl> },
    Vector { item: String },
    Table { fields: Vec<FieldDecl> },
    Option { item: String },
    Union { items: Vec<UnionItem> },
}

impl DeclKind {
    /// Schema keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Array { .. } => "array",
            DeclKind::Struct { .. } => "struct",
            DeclKind::Vector { .. } => "vector",
            DeclKind::Table { .. } => "table",
            DeclKind::Option { .. } => "option",
            DeclKind::Union { .. } => "union",
        }
    }
}

/// A named top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub location: Location,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Every referenced type name in declaration order, `byte` included
    pub fn references(&self) -> Vec<&str> {
        match &self.kind {
            DeclKind::Array { item, .. } | DeclKind::Vector { item } | DeclKind::Option { item } => {
                vec![item.as_str()]
            }
            DeclKind::Struct { fields } | DeclKind::Table { fields } => {
                fields.iter().map(|f| f.type_name.as_str()).collect()
            }
            DeclKind::Union { items } => items.iter().map(|i| i.type_name.as_str()).collect(),
        }
    }
}

/// Declarations in source order with a name index
#[derive(Debug, Clone, Default)]
pub struct Schema {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema, rejecting duplicate names
    pub fn from_declarations<I>(declarations: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut schema = Self::new();
        for decl in declarations {
            schema.insert(decl)?;
        }
        Ok(schema)
    }

    /// Adds a declaration
    ///
    /// # Errors
    ///
    /// `DuplicateName` if the name is already declared or is the built-in
    /// `byte`.
    pub fn insert(&mut self, declaration: Declaration) -> SchemaResult<()> {
        if declaration.name == BYTE || self.index.contains_key(&declaration.name) {
            return Err(SchemaError::duplicate_name(&declaration.name).at(declaration.location));
        }
        self.index
            .insert(declaration.name.clone(), self.declarations.len());
        self.declarations.push(declaration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declarations in source order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations ordered so every declaration follows the ones it references.
    ///
    /// References to `byte` and to undeclared names are ignored; ties keep
    /// source order.
    ///
    /// # Errors
    ///
    /// `CircularDependency` naming the cycle, e.g. `A -> B -> A`.
    pub fn dependency_order(&self) -> SchemaResult<Vec<&Declaration>> {
        let mut marks = vec![Mark::Unvisited; self.declarations.len()];
        let mut order = Vec::with_capacity(self.declarations.len());
        let mut stack = Vec::new();
        for i in 0..self.declarations.len() {
            self.visit(i, &mut marks, &mut stack, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'s>(
        &'s self,
        i: usize,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<&'s Declaration>,
    ) -> SchemaResult<()> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = stack.iter().position(|&s| s == i).unwrap_or(0);
                let mut cycle: Vec<&str> = stack[start..]
                    .iter()
                    .map(|&s| self.declarations[s].name.as_str())
                    .collect();
                cycle.push(self.declarations[i].name.as_str());
                return Err(SchemaError::circular_dependency(&cycle)
                    .at(self.declarations[i].location));
            }
            Mark::Unvisited => {}
        }

        marks[i] = Mark::InProgress;
        stack.push(i);
        for reference in self.declarations[i].references() {
            if let Some(&dep) = self.index.get(reference) {
                self.visit(dep, marks, stack, order)?;
            }
        }
        stack.pop();
        marks[i] = Mark::Done;
        order.push(&self.declarations[i]);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}
