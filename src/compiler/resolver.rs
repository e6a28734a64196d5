//! Memoized resolution of declarations into codecs
//!
//! Each name moves `absent -> InProgress -> Done`. A reference that reaches
//! an `InProgress` name is a cycle and fails instead of recursing forever.
//! `Done` entries are returned as shared handles, so a type referenced from
//! many places is built once.

use std::collections::HashMap;

use super::errors::{CompileError, CompileResult};
use super::CompilerOptions;
use crate::codec::number::numeric_alias;
use crate::codec::{Codec, CodecError};
use crate::schema::{DeclKind, Declaration, Schema, SchemaError, BYTE};

enum Slot {
    InProgress,
    Done(Codec),
}

pub(crate) struct Resolver<'s> {
    schema: &'s Schema,
    options: CompilerOptions,
    refs: &'s HashMap<String, Codec>,
    memo: HashMap<String, Slot>,
    /// Names being resolved, outermost first
    stack: Vec<String>,
    /// Number of declarations built so far
    pub(crate) builds: usize,
}

impl<'s> Resolver<'s> {
    pub fn new(
        schema: &'s Schema,
        options: CompilerOptions,
        refs: &'s HashMap<String, Codec>,
    ) -> Self {
        Self {
            schema,
            options,
            refs,
            memo: HashMap::new(),
            stack: Vec::new(),
            builds: 0,
        }
    }

    pub fn resolve(&mut self, name: &str) -> CompileResult<Codec> {
        if let Some(codec) = self.refs.get(name) {
            return Ok(codec.clone());
        }
        if name == BYTE {
            return Ok(Codec::byte());
        }
        match self.memo.get(name) {
            Some(Slot::Done(codec)) => return Ok(codec.clone()),
            Some(Slot::InProgress) => return Err(self.cycle_error(name)),
            None => {}
        }

        let schema = self.schema;
        let decl = schema.get(name).ok_or_else(|| {
            let from = self.stack.last().map(String::as_str).unwrap_or(name);
            SchemaError::unknown_type(from, name)
        })?;

        self.memo.insert(name.to_string(), Slot::InProgress);
        self.stack.push(name.to_string());
        let built = self.build(decl);
        self.stack.pop();

        match built {
            Ok(codec) => {
                self.builds += 1;
                self.memo
                    .insert(name.to_string(), Slot::Done(codec.clone()));
                Ok(codec)
            }
            Err(e) => {
                self.memo.remove(name);
                Err(e)
            }
        }
    }

    fn cycle_error(&self, name: &str) -> CompileError {
        let start = self.stack.iter().position(|s| s == name).unwrap_or(0);
        let mut cycle: Vec<&str> = self.stack[start..].iter().map(String::as_str).collect();
        cycle.push(name);
        SchemaError::circular_dependency(&cycle).into()
    }

    fn build(&mut self, decl: &Declaration) -> CompileResult<Codec> {
        let name = decl.name.as_str();
        let wrap = |e: CodecError| CompileError::codec(name, e);
        match &decl.kind {
            DeclKind::Array { item, count } if item == BYTE => self.byte_array(name, *count),
            DeclKind::Array { item, count } => {
                let item = self.resolve(item)?;
                Codec::array(item, *count).map_err(wrap)
            }
            DeclKind::Struct { fields } => {
                let mut resolved = Vec::with_capacity(fields.len());
                for field in fields {
                    resolved.push((field.name.clone(), self.resolve(&field.type_name)?));
                }
                Codec::structure(resolved).map_err(wrap)
            }
            DeclKind::Vector { item } if item == BYTE => Ok(Codec::bytes()),
            DeclKind::Vector { item } => {
                let item = self.resolve(item)?;
                Codec::vector(item).map_err(wrap)
            }
            DeclKind::Table { fields } => {
                let mut resolved = Vec::with_capacity(fields.len());
                for field in fields {
                    resolved.push((field.name.clone(), self.resolve(&field.type_name)?));
                }
                Codec::table(resolved).map_err(wrap)
            }
            DeclKind::Option { item } => {
                let item = self.resolve(item)?;
                Codec::option(item).map_err(wrap)
            }
            DeclKind::Union { items } => {
                let mut resolved = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    let id = match item.id {
                        Some(id) => id,
                        None => u32::try_from(position).map_err(|_| {
                            wrap(CodecError::invalid_definition("too many union items"))
                        })?,
                    };
                    resolved.push((item.type_name.clone(), id, self.resolve(&item.type_name)?));
                }
                Codec::union_with_ids(resolved).map_err(wrap)
            }
        }
    }

    /// `array Name [byte; N]`: numeric when named like one, opaque bytes otherwise
    fn byte_array(&self, name: &str, count: usize) -> CompileResult<Codec> {
        if self.options.numeric_aliases {
            if let Some((width, endian)) = numeric_alias(name) {
                if width != count {
                    return Err(CompileError::codec(
                        name,
                        CodecError::invalid_definition(format!(
                            "numeric type must be array [byte; {}], found {} bytes",
                            width, count
                        )),
                    ));
                }
                return Codec::uint(width, endian).map_err(|e| CompileError::codec(name, e));
            }
        }
        Ok(Codec::fixed_bytes(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn resolver_for<'s>(
        schema: &'s Schema,
        refs: &'s HashMap<String, Codec>,
    ) -> Resolver<'s> {
        Resolver::new(schema, CompilerOptions::default(), refs)
    }

    #[test]
    fn test_diamond_is_built_once() {
        let schema = parse_schema(
            "vector Bytes <byte>;
             table Left { a: Bytes }
             table Right { b: Bytes }
             table Top { l: Left, r: Right }",
        )
        .unwrap();
        let refs = HashMap::new();
        let mut resolver = resolver_for(&schema, &refs);
        resolver.resolve("Top").unwrap();
        assert_eq!(resolver.builds, 4);

        let again = resolver.resolve("Bytes").unwrap();
        let first = resolver.resolve("Bytes").unwrap();
        assert!(again.ptr_eq(&first));
        assert_eq!(resolver.builds, 4);
    }

    #[test]
    fn test_cycle_is_detected_without_overflow() {
        let schema = parse_schema("table A { b: B }\ntable B { a: A }").unwrap();
        let refs = HashMap::new();
        let mut resolver = resolver_for(&schema, &refs);
        let err = resolver.resolve("A").unwrap_err();
        assert_eq!(err.code(), "MOL_SCHEMA_CIRCULAR_DEPENDENCY");
        assert!(format!("{}", err).contains("A -> B -> A"));
    }

    #[test]
    fn test_byte_array_specializations() {
        let schema = parse_schema(
            "array Uint32 [byte; 4];
             array Uint64BE [byte; 8];
             array Byte32 [byte; 32];
             array Uint16 [byte; 4];",
        )
        .unwrap();
        let refs = HashMap::new();
        let mut resolver = resolver_for(&schema, &refs);
        assert_eq!(resolver.resolve("Uint32").unwrap().kind_name(), "uint");
        assert_eq!(resolver.resolve("Uint64BE").unwrap().byte_length(), Some(8));
        let byte32 = resolver.resolve("Byte32").unwrap();
        assert_eq!(byte32.byte_length(), Some(32));
        assert_eq!(byte32.kind_name(), "array");
        let err = resolver.resolve("Uint16").unwrap_err();
        assert_eq!(err.code(), "MOL_COMPILE_INVALID_CODEC");
    }

    #[test]
    fn test_numeric_aliases_can_be_disabled() {
        let schema = parse_schema("array Uint32 [byte; 4];").unwrap();
        let refs = HashMap::new();
        let options = CompilerOptions {
            numeric_aliases: false,
        };
        let mut resolver = Resolver::new(&schema, options, &refs);
        let codec = resolver.resolve("Uint32").unwrap();
        assert_eq!(codec.kind_name(), "array");
        assert_eq!(codec.byte_length(), Some(4));
    }

    #[test]
    fn test_refs_take_precedence() {
        let schema = parse_schema("table T { hash: Hash }").unwrap();
        let mut refs = HashMap::new();
        refs.insert("Hash".to_string(), Codec::fixed_bytes(32));
        let mut resolver = resolver_for(&schema, &refs);
        assert!(resolver.resolve("T").is_ok());
        assert!(resolver.resolve("Hash").unwrap().ptr_eq(&refs["Hash"]));
    }

    #[test]
    fn test_unknown_reference() {
        let schema = parse_schema("table T { hash: Hash }").unwrap();
        let refs = HashMap::new();
        let mut resolver = resolver_for(&schema, &refs);
        let err = resolver.resolve("T").unwrap_err();
        assert_eq!(err.code(), "MOL_SCHEMA_UNKNOWN_TYPE");
    }
}
