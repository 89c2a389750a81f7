//! Root-relative path resolution
//!
//! Every path written into a bootstrap artifact is expressed relative to the
//! project root. The resolver canonicalizes each input (following symlinks and
//! collapsing `.`/`..`), checks that it lies strictly below the root, and
//! memoizes the answer so one emission sees a single consistent view of the
//! filesystem.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use cow_utils::CowUtils;
use log::debug;

use crate::{
    error::{Result, WriterError},
    types::FxIndexMap,
};

/// Canonicalize a path, attaching it to the error on failure
pub fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| WriterError::filesystem(path, e))
}

/// Render a relative path with `/` separators, regardless of platform
fn to_slash_string(relative: &Path, original: &Path) -> Result<String> {
    let relative = relative.to_str().ok_or_else(|| WriterError::NonUtf8Path {
        path: original.to_path_buf(),
    })?;
    Ok(relative.cow_replace(MAIN_SEPARATOR, "/").into_owned())
}

/// Resolves filesystem paths to root-relative references.
///
/// The cache is owned by the instance and is dropped with it; independent
/// emissions must use independent resolvers.
#[derive(Debug, Default)]
pub struct PathResolver {
    /// Canonical project root
    root: Option<PathBuf>,
    /// Input path -> root-relative path
    cache: FxIndexMap<PathBuf, String>,
}

impl PathResolver {
    /// Create a resolver for an already canonical root
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            cache: FxIndexMap::default(),
        }
    }

    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or(WriterError::RootNotSet)
    }

    /// Resolve `path` to its `/`-separated location relative to the root.
    ///
    /// Fails with [`WriterError::PathOutsideRoot`] unless the canonical path
    /// starts with the canonical root followed by a separator.
    pub fn relative_path(&mut self, path: &Path) -> Result<String> {
        if let Some(cached) = self.cache.get(path) {
            debug!("Resolved {} from cache", path.display());
            return Ok(cached.clone());
        }

        let root = self.root()?;
        let canonical = canonicalize(path)?;
        debug!(
            "Canonicalized {} to {}",
            path.display(),
            canonical.display()
        );

        let outside_root = || WriterError::PathOutsideRoot {
            path: canonical.clone(),
            root: root.to_path_buf(),
        };
        let suffix = canonical.strip_prefix(root).map_err(|_| outside_root())?;
        if suffix.as_os_str().is_empty() {
            return Err(outside_root());
        }
        let relative = to_slash_string(suffix, path)?;

        self.cache.insert(path.to_path_buf(), relative.clone());
        Ok(relative)
    }

    /// Number of distinct input paths resolved so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
