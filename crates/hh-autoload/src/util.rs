use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::{Result, WriterError};

/// Replace `destination` with `contents` via a temporary file in the same
/// directory, so readers only ever see the old or the new file.
///
/// An existing destination keeps its permissions; new files are created
/// world-readable rather than with the temp file's private mode.
pub fn write_atomically(destination: &Path, contents: &str) -> Result<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| WriterError::filesystem(dir, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| WriterError::filesystem(temp.path(), e))?;

    let permissions = match fs::metadata(destination) {
        Ok(existing) => Some(existing.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => default_permissions(),
        Err(e) => return Err(WriterError::filesystem(destination, e)),
    };
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| WriterError::filesystem(temp.path(), e))?;
    }

    debug!(
        "Persisting {} to {}",
        temp.path().display(),
        destination.display()
    );
    temp.persist(destination)
        .map_err(|e| WriterError::filesystem(destination, e.error))?;
    Ok(())
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
