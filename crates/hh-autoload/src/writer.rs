//! Bootstrap module emission
//!
//! [`WriterConfig`] collects the files, map, and settings for one bootstrap
//! artifact and renders them into a Hack module with this public surface:
//!
//! - `Facebook\AutoloadMap\Generated\{build_id, root, is_dev, map}`: metadata
//!   and the map literal
//! - `Facebook\AutoloadMap\initialize()`: registers everything with the
//!   runtime, at most once per request
//!
//! `initialize()` latches a static flag before doing anything else, so only
//! the first call reaches `bootstrap()`. Bootstrapping requires the eager files
//! in order, installs the map with `\HH\autoload_set_paths`, unregisters every
//! SPL autoloader so the map takes precedence, and finally wires the optional
//! failure handler. The generated code assumes it is the last piece of loader
//! configuration to run in the process.

use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::{
    ast_builder::{
        assign, bool_literal, call, call_with_args, concat, elvis, expr_stmt,
        final_class_with_static, foreach, function, if_stmt, index, method_call, name, namespace,
        new_instance, require_once, return_void, returning_function, static_call,
        static_property, static_property_decl, string, var, vec_literal,
    },
    builder::Builder,
    codegen::Generator,
    error::{Result, WriterError},
    hack_ast::{Decl, Expr, Item, Module, Stmt},
    map_serializer::serialize_map,
    path_resolver::{PathResolver, canonicalize},
    types::AutoloadMap,
    util::write_atomically,
};

/// Default file name of the generated module
pub const ARTIFACT_FILE_NAME: &str = "autoload.hack";

pub const GENERATED_NAMESPACE: &str = "Facebook\\AutoloadMap\\Generated";
pub const PRIVATE_NAMESPACE: &str = "Facebook\\AutoloadMap\\_Private";
pub const PUBLIC_NAMESPACE: &str = "Facebook\\AutoloadMap";

/// Reserved map key holding the failure handler callback
pub const FAILURE_SLOT: &str = "failure";

pub(crate) const GENERATED_HEADER: &str = "Generated file, do not edit by hand";

static QUALIFIED_CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("class name pattern is valid")
});

/// Fully-qualified reference to a function in the generated namespace
fn generated_fn(name: &str) -> String {
    format!("\\{GENERATED_NAMESPACE}\\{name}")
}

/// Build identifier: ATOM timestamp, `!`, then 16 random bytes as hex
pub fn generate_build_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{}!{hex}", Utc::now().format("%Y-%m-%dT%H:%M:%S%:z"))
}

/// Result of rendering a bootstrap module
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Where the module was (or would be) written
    pub path: PathBuf,
    pub build_id: String,
    pub source: String,
}

/// Configuration for one bootstrap artifact.
///
/// Setters consume and return the config. Nothing is validated until
/// [`render`](Self::render) or [`emit`](Self::emit); the root is canonicalized
/// as soon as it is set. A config may be emitted repeatedly, and each call
/// produces a fresh artifact with a new build id.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    root: Option<PathBuf>,
    relative_root: bool,
    is_dev: Option<bool>,
    failure_handler: Option<String>,
    files: Option<Vec<PathBuf>>,
    map: Option<AutoloadMap>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            root: None,
            relative_root: true,
            is_dev: None,
            failure_handler: None,
            files: None,
            map: None,
        }
    }
}

/// Fields of a config that passed validation
#[derive(Debug)]
struct Validated<'a> {
    files: &'a [PathBuf],
    map: &'a AutoloadMap,
    is_dev: bool,
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project root, canonicalizing it immediately
    pub fn root(mut self, root: impl AsRef<Path>) -> Result<Self> {
        self.root = Some(canonicalize(root.as_ref())?);
        Ok(self)
    }

    /// Express paths relative to the artifact's own directory (the default)
    /// rather than as fixed absolute strings
    #[must_use]
    pub fn relative_root(mut self, relative: bool) -> Self {
        self.relative_root = relative;
        self
    }

    #[must_use]
    pub fn dev(mut self, is_dev: bool) -> Self {
        self.is_dev = Some(is_dev);
        self
    }

    /// Set or clear the failure handler class.
    ///
    /// The name is normalized to start with a backslash.
    pub fn failure_handler(mut self, handler: Option<&str>) -> Result<Self> {
        self.failure_handler = match handler {
            None => None,
            Some(name) if QUALIFIED_CLASS_NAME.is_match(name) => {
                Some(format!("\\{}", name.trim_start_matches('\\')))
            }
            Some(name) => {
                return Err(WriterError::InvalidFailureHandler {
                    name: name.to_owned(),
                });
            }
        };
        Ok(self)
    }

    #[must_use]
    pub fn files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = Some(files);
        self
    }

    #[must_use]
    pub fn autoload_map(mut self, map: AutoloadMap) -> Self {
        self.map = Some(map);
        self
    }

    /// Take both the files and the map from `builder`
    #[must_use]
    pub fn with_builder(self, builder: &dyn Builder) -> Self {
        self.files(builder.files())
            .autoload_map(builder.autoload_map())
    }

    fn validate(&self) -> Result<Validated<'_>> {
        let files = self
            .files
            .as_deref()
            .ok_or(WriterError::MissingConfiguration { field: "files" })?;
        let map = self
            .map
            .as_ref()
            .ok_or(WriterError::MissingConfiguration { field: "map" })?;
        let is_dev = self
            .is_dev
            .ok_or(WriterError::MissingConfiguration { field: "is_dev" })?;
        Ok(Validated { files, map, is_dev })
    }

    /// Render the module destined for `destination` without writing it.
    ///
    /// In relative mode the destination's directory must exist, because the
    /// root expression depends on its canonical depth below the root.
    pub fn render(&self, destination: &Path) -> Result<Artifact> {
        let validated = self.validate()?;
        let mut resolver = PathResolver::new(self.root.clone());
        let root = resolver.root()?.to_path_buf();

        let locator = if self.relative_root {
            Locator::relative(&root, destination)?
        } else {
            Locator::absolute(&root)?
        };

        let mut requires = Vec::with_capacity(validated.files.len());
        for file in validated.files {
            let relative = resolver.relative_path(file)?;
            requires.push(require_once(locator.file(&relative)));
        }
        let map = serialize_map(validated.map, &mut resolver)?;
        debug!(
            "Resolved {} distinct paths for {}",
            resolver.cached_len(),
            destination.display()
        );

        let build_id = generate_build_id();
        let module = bootstrap_module(ModuleParts {
            build_id: &build_id,
            root: locator.root(),
            is_dev: validated.is_dev,
            map,
            requires,
            failure_handler: self.failure_handler.as_deref(),
        });

        Ok(Artifact {
            path: destination.to_path_buf(),
            build_id,
            source: Generator::new().module(&module),
        })
    }

    /// Render and write the module to `destination`, replacing any existing
    /// file. Nothing is written if rendering fails.
    pub fn emit(&self, destination: &Path) -> Result<Artifact> {
        let artifact = self.render(destination)?;
        write_atomically(destination, &artifact.source)?;
        info!(
            "Wrote autoload map ({} symbols, {} files) to {}",
            self.map.as_ref().map_or(0, AutoloadMap::len),
            self.files.as_ref().map_or(0, Vec::len),
            destination.display()
        );
        Ok(artifact)
    }
}

/// How the generated code refers to the root and to files below it
#[derive(Debug)]
enum Locator {
    /// `__DIR__` followed by this many `../`
    Relative { levels: usize },
    /// Fixed absolute root, without a trailing separator
    Absolute { root: String },
}

impl Locator {
    fn relative(root: &Path, destination: &Path) -> Result<Self> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = canonicalize(dir)?;
        let below_root = dir
            .strip_prefix(root)
            .map_err(|_| WriterError::PathOutsideRoot {
                path: destination.to_path_buf(),
                root: root.to_path_buf(),
            })?;
        Ok(Self::Relative {
            levels: below_root.components().count(),
        })
    }

    fn absolute(root: &Path) -> Result<Self> {
        let root = root.to_str().ok_or_else(|| WriterError::NonUtf8Path {
            path: root.to_path_buf(),
        })?;
        Ok(Self::Absolute {
            root: root.trim_end_matches('/').to_owned(),
        })
    }

    /// Expression evaluating to the root with a trailing `/`
    fn root(&self) -> Expr {
        self.file("")
    }

    /// Expression evaluating to the absolute location of a root-relative path
    fn file(&self, relative: &str) -> Expr {
        match self {
            Self::Relative { levels } => concat(
                name("__DIR__"),
                string(format!("/{}{relative}", "../".repeat(*levels))),
            ),
            Self::Absolute { root } => string(format!("{root}/{relative}")),
        }
    }
}

#[derive(Debug)]
struct ModuleParts<'a> {
    build_id: &'a str,
    root: Expr,
    is_dev: bool,
    map: Expr,
    requires: Vec<Stmt>,
    failure_handler: Option<&'a str>,
}

fn bootstrap_module(parts: ModuleParts<'_>) -> Module {
    let generated = namespace(
        GENERATED_NAMESPACE,
        vec![
            returning_function("build_id", "string", string(parts.build_id)),
            returning_function("root", "string", parts.root),
            returning_function("is_dev", "bool", bool_literal(parts.is_dev)),
            returning_function("map", "\\Facebook\\AutoloadMap\\AutoloadMap", parts.map),
        ],
    );

    let private = namespace(
        PRIVATE_NAMESPACE,
        vec![
            final_class_with_static(
                "GlobalState",
                static_property_decl("initialized", "bool", bool_literal(false)),
            ),
            function(
                "bootstrap",
                "void",
                bootstrap_body(parts.requires, parts.failure_handler),
            ),
        ],
    );

    let public = namespace(PUBLIC_NAMESPACE, vec![initialize_function()]);

    Module {
        opening_tag: false,
        header: vec![GENERATED_HEADER.to_owned()],
        body: vec![
            Item::Namespace(generated),
            Item::Namespace(private),
            Item::Namespace(public),
        ],
    }
}

/// `\HH\autoload_set_paths($map, \...\Generated\root());`
fn register_map() -> Stmt {
    expr_stmt(call_with_args(
        "\\HH\\autoload_set_paths",
        vec![var("map"), call(&generated_fn("root"))],
    ))
}

fn bootstrap_body(requires: Vec<Stmt>, failure_handler: Option<&str>) -> Vec<Stmt> {
    let mut body = requires;
    body.push(assign(var("map"), call(&generated_fn("map"))));
    body.push(register_map());
    body.push(foreach(
        elvis(call("\\spl_autoload_functions"), vec_literal(vec![])),
        "autoloader",
        vec![expr_stmt(call_with_args(
            "\\spl_autoload_unregister",
            vec![var("autoloader")],
        ))],
    ));
    if let Some(handler) = failure_handler {
        body.push(failure_handler_block(handler));
    }
    body
}

/// Instantiate the handler, install it in the reserved slot, re-register the
/// composite map, then let the handler initialize against the active map.
fn failure_handler_block(handler: &str) -> Stmt {
    if_stmt(
        static_call(handler, "isEnabled", vec![]),
        vec![
            assign(var("handler"), new_instance(handler, vec![])),
            assign(
                index(var("map"), string(FAILURE_SLOT)),
                call_with_args("inst_meth", vec![var("handler"), string("handleFailure")]),
            ),
            register_map(),
            expr_stmt(method_call(var("handler"), "initialize", vec![])),
        ],
    )
}

fn initialize_function() -> Decl {
    let latch = || static_property("_Private\\GlobalState", "initialized");
    function(
        "initialize",
        "void",
        vec![
            if_stmt(latch(), vec![return_void()]),
            assign(latch(), bool_literal(true)),
            expr_stmt(call("_Private\\bootstrap")),
        ],
    )
}
