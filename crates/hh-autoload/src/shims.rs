//! Compatibility entry points for projects that still include
//! `vendor/hh_autoload.php` or `vendor/hh_autoload.hh`.

use std::path::{Path, PathBuf};

use log::info;

use crate::{
    ast_builder::{call, concat, expr_stmt, name, require_once, string},
    codegen::Generator,
    error::Result,
    hack_ast::{Item, Module},
    util::write_atomically,
    writer::{GENERATED_HEADER, PUBLIC_NAMESPACE},
};

/// File names of the legacy entry points
pub const LEGACY_SHIMS: [&str; 2] = ["hh_autoload.php", "hh_autoload.hh"];

/// Source of a shim that loads `artifact_name` from its own directory and
/// initializes it
pub fn shim_source(artifact_name: &str) -> String {
    let module = Module {
        opening_tag: true,
        header: vec![GENERATED_HEADER.to_owned()],
        body: vec![
            Item::Stmt(require_once(concat(
                name("__DIR__"),
                string(format!("/{artifact_name}")),
            ))),
            Item::Stmt(expr_stmt(call(&format!(
                "\\{PUBLIC_NAMESPACE}\\initialize"
            )))),
        ],
    };
    Generator::new().module(&module)
}

/// Write every legacy shim into `dir`, next to the artifact named
/// `artifact_name`. Returns the paths written.
pub fn write_legacy_shims(dir: &Path, artifact_name: &str) -> Result<Vec<PathBuf>> {
    let source = shim_source(artifact_name);
    let mut written = Vec::with_capacity(LEGACY_SHIMS.len());
    for shim in LEGACY_SHIMS {
        let path = dir.join(shim);
        write_atomically(&path, &source)?;
        info!("Wrote legacy entry point {}", path.display());
        written.push(path);
    }
    Ok(written)
}
