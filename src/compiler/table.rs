//! Compiled codec table
//!
//! Immutable once built: lookups only, no mutation, so a table can be
//! shared across threads behind an `Arc` without locking.

use std::collections::HashMap;

use super::errors::{CompileError, CompileResult};
use crate::codec::Codec;

/// Name to codec mapping in declaration order
#[derive(Debug, Clone, Default)]
pub struct CodecTable {
    entries: Vec<(String, Codec)>,
    index: HashMap<String, usize>,
}

impl CodecTable {
    pub(crate) fn from_entries(entries: Vec<(String, Codec)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&Codec> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Like [`get`](Self::get), with a typed error for unknown names
    pub fn codec(&self, name: &str) -> CompileResult<&Codec> {
        self.get(name)
            .ok_or_else(|| CompileError::UnknownCodec(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Codec)> {
        self.entries.iter().map(|(name, codec)| (name.as_str(), codec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
