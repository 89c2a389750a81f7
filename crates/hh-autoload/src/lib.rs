//! Compiles a Hack autoload map into a self-initializing bootstrap module.
//!
//! A [`builder::Builder`] supplies the files to require and the symbol map;
//! [`writer::WriterConfig`] validates them against the project root and emits
//! `autoload.hack`, and [`shims`] writes the legacy `hh_autoload.*` entry
//! points that delegate to it.

pub mod ast_builder;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod dirs;
pub mod error;
pub mod hack_ast;
pub mod map_serializer;
pub mod path_resolver;
pub mod shims;
pub mod types;
pub mod util;
pub mod writer;

pub use error::WriterError;
pub use types::{AutoloadMap, SymbolKind};
pub use writer::WriterConfig;
