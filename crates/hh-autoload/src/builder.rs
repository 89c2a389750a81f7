//! Sources of autoload data
//!
//! A [`Builder`] is whatever discovers symbols: a source scanner, a package
//! manager importer, or a manifest written by one of those. The writer only
//! ever sees the trait, so discovery stays outside this crate.

use std::{
    fs,
    path::{Path, PathBuf},
};

use cow_utils::CowUtils;
use log::{debug, warn};
use serde::Deserialize;

use crate::{
    error::{Result, WriterError},
    types::{AutoloadMap, FxIndexMap, FxIndexSet, SymbolKind},
};

/// Manifest looked up in the project root when none is given explicitly
pub const DEFAULT_MANIFEST_FILE: &str = "hh_autoload.manifest.toml";

/// Provider of the files to require eagerly and the map to load lazily
pub trait Builder: std::fmt::Debug {
    /// Absolute paths to require on initialization, in load order
    fn files(&self) -> Vec<PathBuf>;

    /// Absolute paths of every autoloadable symbol
    fn autoload_map(&self) -> AutoloadMap;
}

/// Builder over data that is already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticBuilder {
    pub files: Vec<PathBuf>,
    pub map: AutoloadMap,
}

impl StaticBuilder {
    pub fn new(files: Vec<PathBuf>, map: AutoloadMap) -> Self {
        Self { files, map }
    }
}

impl Builder for StaticBuilder {
    fn files(&self) -> Vec<PathBuf> {
        self.files.clone()
    }

    fn autoload_map(&self) -> AutoloadMap {
        self.map.clone()
    }
}

/// On-disk manifest layout
///
/// ```toml
/// files = ["bootstrap.hack"]
///
/// [map.class]
/// Foo = "src/Foo.hack"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    map: FxIndexMap<SymbolKind, FxIndexMap<String, PathBuf>>,
}

/// Builder reading a TOML manifest produced by an external scanner.
///
/// Relative paths in the manifest are resolved against `base`, normally the
/// project root. Class, function and type names are lowercased to match how
/// HHVM looks them up; constant names are kept as written.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    files: Vec<PathBuf>,
    map: AutoloadMap,
}

impl ManifestBuilder {
    pub fn from_path(path: &Path, base: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| WriterError::filesystem(path, e))?;
        let builder = Self::parse(&contents, base, path)?;
        debug!(
            "Loaded manifest {} with {} files and {} symbols",
            path.display(),
            builder.files.len(),
            builder.map.len()
        );
        Ok(builder)
    }

    /// Parse manifest `contents`; `origin` only labels errors
    pub fn parse(contents: &str, base: &Path, origin: &Path) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents).map_err(|e| WriterError::Manifest {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let files = manifest.files.iter().map(|file| base.join(file)).collect();
        let mut map = AutoloadMap::new();
        for (kind, symbols) in manifest.map {
            for (name, path) in symbols {
                let name = if kind.is_case_insensitive() {
                    name.cow_to_ascii_lowercase().into_owned()
                } else {
                    name
                };
                map.insert(kind, name, base.join(path));
            }
        }
        Ok(Self { files, map })
    }
}

impl Builder for ManifestBuilder {
    fn files(&self) -> Vec<PathBuf> {
        self.files.clone()
    }

    fn autoload_map(&self) -> AutoloadMap {
        self.map.clone()
    }
}

/// Combines several builders into one.
///
/// Files are concatenated in builder order with duplicates dropped at their
/// later occurrences. For maps, a later builder overrides an earlier one when
/// both define the same symbol.
#[derive(Debug, Default)]
pub struct Merger {
    builders: Vec<Box<dyn Builder>>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, builder: impl Builder + 'static) -> Self {
        self.builders.push(Box::new(builder));
        self
    }
}

impl Builder for Merger {
    fn files(&self) -> Vec<PathBuf> {
        let files: FxIndexSet<PathBuf> = self
            .builders
            .iter()
            .flat_map(|builder| builder.files())
            .collect();
        files.into_iter().collect()
    }

    fn autoload_map(&self) -> AutoloadMap {
        let mut merged = AutoloadMap::new();
        for builder in &self.builders {
            let map = builder.autoload_map();
            for kind in SymbolKind::ALL {
                for (name, path) in map.symbols(kind) {
                    if let Some(previous) = merged.insert(kind, name, path) {
                        if previous != path {
                            warn!(
                                "{kind} '{name}' is defined in both {} and {}; using the latter",
                                previous.display(),
                                path.display()
                            );
                        }
                    }
                }
            }
        }
        merged
    }
}
