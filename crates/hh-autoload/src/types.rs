//! Shared type definitions for the hh-autoload crate
//!
//! This module contains the data model exchanged between builders and the
//! writer: the kinds of autoloadable symbols and the autoload map itself.

use std::{
    hash::BuildHasherDefault,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;
use serde::Deserialize;

/// Type alias for `IndexMap` with `FxHasher` for better performance
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// Type alias for `IndexSet` with `FxHasher` for better performance
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Category of an autoloadable Hack symbol
///
/// The declaration order is the order kinds appear in the generated map, so
/// the derived `Ord` doubles as the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Classes, interfaces, traits and enums
    Class,

    /// Top-level functions
    Function,

    /// Type aliases and newtypes
    Type,

    /// Top-level constants
    Constant,
}

impl SymbolKind {
    pub const ALL: [Self; 4] = [Self::Class, Self::Function, Self::Type, Self::Constant];

    /// Key used for this kind in the generated `AutoloadMap` shape
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Type => "type",
            Self::Constant => "constant",
        }
    }

    /// HHVM resolves classes, functions and types case-insensitively through
    /// lowercased map keys; constants keep their case
    pub fn is_case_insensitive(&self) -> bool {
        !matches!(self, Self::Constant)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown symbol kind '{s}'"))
    }
}

/// Symbol-to-file index partitioned by symbol kind
///
/// Names are unique within a kind; inserting an existing name replaces its
/// path. Iteration follows insertion order; the serializer is responsible for
/// producing a stable order in generated output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoloadMap {
    symbols: FxIndexMap<SymbolKind, FxIndexMap<String, PathBuf>>,
}

impl AutoloadMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` of `kind` as defined in `path`, returning the previous
    /// path if the name was already present.
    pub fn insert(
        &mut self,
        kind: SymbolKind,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Option<PathBuf> {
        self.symbols
            .entry(kind)
            .or_default()
            .insert(name.into(), path.into())
    }

    pub fn get(&self, kind: SymbolKind, name: &str) -> Option<&Path> {
        self.symbols
            .get(&kind)
            .and_then(|names| names.get(name))
            .map(PathBuf::as_path)
    }

    /// Symbols of one kind, in insertion order
    pub fn symbols(&self, kind: SymbolKind) -> impl Iterator<Item = (&str, &Path)> {
        self.symbols
            .get(&kind)
            .into_iter()
            .flat_map(|names| names.iter().map(|(n, p)| (n.as_str(), p.as_path())))
    }

    pub fn len(&self) -> usize {
        self.symbols.values().map(FxIndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
