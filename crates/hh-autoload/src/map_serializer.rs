//! Conversion of an [`AutoloadMap`] into a Hack `dict` literal
//!
//! Every kind of the `AutoloadMap` shape is always present so the literal
//! satisfies the shape type even for empty kinds. Names are sorted within each
//! kind, making the output independent of builder insertion order.

use log::debug;

use crate::{
    ast_builder::{dict, string},
    error::Result,
    hack_ast::Expr,
    path_resolver::PathResolver,
    types::{AutoloadMap, SymbolKind},
};

/// Build the map literal, replacing each leaf path with its root-relative form.
///
/// The first path that fails resolution aborts serialization.
pub fn serialize_map(map: &AutoloadMap, resolver: &mut PathResolver) -> Result<Expr> {
    let mut kinds = Vec::with_capacity(SymbolKind::ALL.len());
    for kind in SymbolKind::ALL {
        let mut symbols: Vec<_> = map.symbols(kind).collect();
        symbols.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let mut entries = Vec::with_capacity(symbols.len());
        for (name, path) in symbols {
            let relative = resolver.relative_path(path)?;
            entries.push((string(name), string(relative)));
        }
        debug!("Serialized {} {kind} entries", entries.len());
        kinds.push((string(kind.as_str()), dict(entries)));
    }
    Ok(dict(kinds))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::{codegen::Generator, error::WriterError};

    /// Read a serialized literal back into a map of root-relative paths
    fn map_from_expr(expr: &Expr) -> AutoloadMap {
        let mut map = AutoloadMap::new();
        let Expr::Dict(kinds) = expr else {
            panic!("Expected dict literal, got {expr:?}");
        };
        for (kind, names) in kinds {
            let (Expr::String(kind), Expr::Dict(names)) = (kind, names) else {
                panic!("Expected kind => dict entry");
            };
            let kind: SymbolKind = kind.parse().unwrap();
            for (name, path) in names {
                let (Expr::String(name), Expr::String(path)) = (name, path) else {
                    panic!("Expected name => path entry");
                };
                map.insert(kind, name.clone(), PathBuf::from(path));
            }
        }
        map
    }

    fn project(files: &[&str]) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        (temp_dir, root)
    }

    #[test]
    fn test_round_trip_after_relativization() {
        let (_guard, root) = project(&["src/Foo.hack", "src/fun.hack", "lib/T.hack"]);
        let mut map = AutoloadMap::new();
        map.insert(SymbolKind::Class, "Foo", root.join("src/Foo.hack"));
        map.insert(SymbolKind::Function, "fun", root.join("src/fun.hack"));
        map.insert(SymbolKind::Type, "T", root.join("lib/./T.hack"));
        map.insert(SymbolKind::Constant, "FUN_C", root.join("src/fun.hack"));

        let mut resolver = PathResolver::new(Some(root));
        let expr = serialize_map(&map, &mut resolver).unwrap();

        let mut expected = AutoloadMap::new();
        expected.insert(SymbolKind::Class, "Foo", "src/Foo.hack");
        expected.insert(SymbolKind::Function, "fun", "src/fun.hack");
        expected.insert(SymbolKind::Type, "T", "lib/T.hack");
        expected.insert(SymbolKind::Constant, "FUN_C", "src/fun.hack");
        assert_eq!(map_from_expr(&expr), expected);
        assert_eq!(resolver.cached_len(), 3);
    }

    #[test]
    fn test_output_is_independent_of_insertion_order() {
        let (_guard, root) = project(&["a.hack", "b.hack", "c.hack"]);

        let mut forward = AutoloadMap::new();
        let mut backward = AutoloadMap::new();
        for name in ["a", "b", "c"] {
            forward.insert(SymbolKind::Class, name, root.join(format!("{name}.hack")));
        }
        for name in ["c", "b", "a"] {
            backward.insert(SymbolKind::Class, name, root.join(format!("{name}.hack")));
        }
        backward.insert(SymbolKind::Constant, "X", root.join("a.hack"));
        forward.insert(SymbolKind::Constant, "X", root.join("a.hack"));

        let forward = serialize_map(&forward, &mut PathResolver::new(Some(root.clone()))).unwrap();
        let backward = serialize_map(&backward, &mut PathResolver::new(Some(root))).unwrap();
        assert_eq!(
            Generator::new().expression(&forward),
            Generator::new().expression(&backward)
        );
    }

    #[test]
    fn test_all_kinds_present_when_empty() {
        let (_guard, root) = project(&[]);
        let expr = serialize_map(&AutoloadMap::new(), &mut PathResolver::new(Some(root))).unwrap();
        let expected = "dict[
  'class' => dict[],
  'function' => dict[],
  'type' => dict[],
  'constant' => dict[],
]";
        assert_eq!(Generator::new().expression(&expr), expected);
    }

    #[test]
    fn test_path_outside_root_aborts() {
        let (_guard, root) = project(&["inside/Ok.hack", "outside/Bad.hack"]);
        let mut map = AutoloadMap::new();
        map.insert(SymbolKind::Class, "Ok", root.join("inside/Ok.hack"));
        map.insert(SymbolKind::Class, "Bad", root.join("outside/Bad.hack"));

        let err = serialize_map(&map, &mut PathResolver::new(Some(root.join("inside"))))
            .unwrap_err();
        match err {
            WriterError::PathOutsideRoot { path, root: reported_root } => {
                assert_eq!(path, root.join("outside/Bad.hack"));
                assert_eq!(reported_root, root.join("inside"));
            }
            other => panic!("Expected PathOutsideRoot, got {other:?}"),
        }
    }
}
