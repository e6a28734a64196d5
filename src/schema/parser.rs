//! Schema parser
//!
//! Grammar (one declaration per name):
//!
//! ```text
//! file        := (import | declaration)*
//! import      := "import" STRING ";"
//! declaration := "array"  NAME "[" TYPE ";" NUMBER "]" ";"
//!              | "struct" NAME "{" fields "}" ";"?
//!              | "vector" NAME "<" TYPE ">" ";"
//!              | "table"  NAME "{" fields "}" ";"?
//!              | "option" NAME "(" TYPE ")" ";"
//!              | "union"  NAME "{" items "}" ";"?
//! fields      := (NAME ":" TYPE ("," NAME ":" TYPE)* ","?)?
//! items       := (TYPE (":" NUMBER)? ("," TYPE (":" NUMBER)?)* ","?)?
//! ```
//!
//! The parser only checks syntax. Name resolution and layout rules belong
//! to the validator.

use super::errors::{SchemaError, SchemaResult};
use super::lexer::{Lexer, Token, TokenKind};
use super::types::{DeclKind, Declaration, FieldDecl, Location, Schema, UnionItem};

/// `import "path";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub location: Location,
}

/// Parsed contents of one schema file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFile {
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
}

/// Parses schema text, keeping imports unresolved
pub fn parse(text: &str) -> SchemaResult<SchemaFile> {
    let tokens = Lexer::new(text).tokenize()?;
    Parser { tokens, pos: 0 }.file()
}

/// Parses self-contained schema text into a [`Schema`]
///
/// # Errors
///
/// Any syntax error, a duplicate declaration name, or an `import` statement
/// (imports need a file system; use `SchemaLoader`).
pub fn parse_schema(text: &str) -> SchemaResult<Schema> {
    let file = parse(text)?;
    if let Some(import) = file.imports.first() {
        return Err(SchemaError::parse(
            import.location,
            format!("cannot resolve import \"{}\" without a loader", import.path),
        ));
    }
    Schema::from_declarations(file.declarations)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize() always ends with Eof and the parser never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> SchemaResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn unexpected(&self, wanted: &str) -> SchemaError {
        let token = self.peek();
        SchemaError::parse(
            token.location,
            format!("expected {}, found {}", wanted, token.kind.describe()),
        )
    }

    fn ident(&mut self, what: &str) -> SchemaResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn number(&mut self, what: &str) -> SchemaResult<(u64, Location)> {
        let n = match self.peek().kind {
            TokenKind::Number(n) => n,
            _ => return Err(self.unexpected(what)),
        };
        let location = self.advance().location;
        Ok((n, location))
    }

    fn file(mut self) -> SchemaResult<SchemaFile> {
        let mut file = SchemaFile::default();
        loop {
            let token = self.peek().clone();
            let keyword = match &token.kind {
                TokenKind::Eof => return Ok(file),
                TokenKind::Ident(keyword) => keyword.clone(),
                _ => return Err(self.unexpected("a declaration")),
            };
            if keyword == "import" {
                self.advance();
                file.imports.push(self.import(token.location)?);
                continue;
            }
            let decl = self.declaration(&keyword)?;
            file.declarations.push(decl.at(token.location));
        }
    }

    fn import(&mut self, location: Location) -> SchemaResult<Import> {
        let path = match &self.peek().kind {
            TokenKind::Str(path) => path.clone(),
            _ => return Err(self.unexpected("an import path string")),
        };
        self.advance();
        self.expect(TokenKind::Semicolon)?;
        Ok(Import { path, location })
    }

    fn declaration(&mut self, keyword: &str) -> SchemaResult<Declaration> {
        let kind_is_known = matches!(
            keyword,
            "array" | "struct" | "vector" | "table" | "option" | "union"
        );
        if !kind_is_known {
            return Err(self.unexpected("a declaration keyword"));
        }
        self.advance();
        let name = self.ident("a type name")?;

        let kind = match keyword {
            "array" => {
                self.expect(TokenKind::LBracket)?;
                let item = self.ident("an item type")?;
                self.expect(TokenKind::Semicolon)?;
                let (count, location) = self.number("an item count")?;
                let count = usize::try_from(count).map_err(|_| {
                    SchemaError::parse(location, format!("item count {} is too large", count))
                })?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Semicolon)?;
                DeclKind::Array { item, count }
            }
            "vector" => {
                self.expect(TokenKind::LAngle)?;
                let item = self.ident("an item type")?;
                self.expect(TokenKind::RAngle)?;
                self.expect(TokenKind::Semicolon)?;
                DeclKind::Vector { item }
            }
            "option" => {
                self.expect(TokenKind::LParen)?;
                let item = self.ident("an item type")?;
                self.expect(TokenKind::RParen)?;
                self.expect(TokenKind::Semicolon)?;
                DeclKind::Option { item }
            }
            "struct" => DeclKind::Struct {
                fields: self.fields()?,
            },
            "table" => DeclKind::Table {
                fields: self.fields()?,
            },
            _ => DeclKind::Union {
                items: self.union_items()?,
            },
        };
        Ok(Declaration::new(name, kind))
    }

    /// `{ name: Type, ... }` with an optional `;` after the brace
    fn fields(&mut self) -> SchemaResult<Vec<FieldDecl>> {
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let name = self.ident("a field name or '}'")?;
            self.expect(TokenKind::Colon)?;
            let type_name = self.ident("a field type")?;
            fields.push(FieldDecl { name, type_name });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(&TokenKind::Semicolon);
        Ok(fields)
    }

    fn union_items(&mut self) -> SchemaResult<Vec<UnionItem>> {
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let type_name = self.ident("a union item or '}'")?;
            let id = if self.eat(&TokenKind::Colon) {
                let (id, location) = self.number("a union item id")?;
                let id = u32::try_from(id).map_err(|_| {
                    SchemaError::parse(location, format!("union id {} does not fit in u32", id))
                })?;
                Some(id)
            } else {
                None
            };
            items.push(UnionItem { type_name, id });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(&TokenKind::Semicolon);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;

    #[test]
    fn test_all_declaration_kinds() {
        let text = r#"
            array Byte32 [byte; 32];
            struct OutPoint { tx_hash: Byte32, index: Uint32 }
            vector Bytes <byte>;
            table Script { code_hash: Byte32, hash_type: byte, args: Bytes, };
            option BytesOpt (Bytes);
            union Payload { Bytes, Script: 5 }
        "#;
        let file = parse(text).unwrap();
        assert!(file.imports.is_empty());
        let decls = file.declarations;
        assert_eq!(decls.len(), 6);
        assert_eq!(
            decls[0].kind,
            DeclKind::Array {
                item: "byte".into(),
                count: 32
            }
        );
        assert_eq!(
            decls[1].kind,
            DeclKind::Struct {
                fields: vec![
                    FieldDecl::new("tx_hash", "Byte32"),
                    FieldDecl::new("index", "Uint32"),
                ]
            }
        );
        assert_eq!(decls[2].kind, DeclKind::Vector { item: "byte".into() });
        assert!(matches!(&decls[3].kind, DeclKind::Table { fields } if fields.len() == 3));
        assert_eq!(decls[4].kind, DeclKind::Option { item: "Bytes".into() });
        assert_eq!(
            decls[5].kind,
            DeclKind::Union {
                items: vec![UnionItem::new("Bytes"), UnionItem::with_id("Script", 5)]
            }
        );
        assert_eq!(decls[1].location, Location::new(3, 13));
    }

    #[test]
    fn test_imports() {
        let file = parse("import \"basic\";\nvector Bytes <byte>;").unwrap();
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.imports[0].path, "basic");
        assert_eq!(file.declarations.len(), 1);
    }

    #[test]
    fn test_parse_schema_rejects_imports() {
        let err = parse_schema("import \"basic\";").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ParseError);
    }

    #[test]
    fn test_missing_semicolon_reports_location() {
        let err = parse("vector Bytes <byte>\narray A [byte; 2];").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ParseError);
        assert_eq!(err.location(), Some(Location::new(2, 1)));
        assert!(err.message().contains("expected ';'"));
    }

    #[test]
    fn test_unknown_keyword() {
        let err = parse("enum Color { Red }").unwrap_err();
        assert!(err.message().contains("declaration keyword"));
    }

    #[test]
    fn test_empty_bodies_parse() {
        let file = parse("table Empty {}\nunion Nothing {};").unwrap();
        assert_eq!(file.declarations[0].kind, DeclKind::Table { fields: vec![] });
        assert_eq!(file.declarations[1].kind, DeclKind::Union { items: vec![] });
    }

    #[test]
    fn test_parse_schema_rejects_duplicates() {
        let err = parse_schema("vector A <byte>;\nvector A <byte>;").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateName);
        assert_eq!(err.location(), Some(Location::new(2, 1)));
    }
}
