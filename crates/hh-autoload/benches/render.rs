use std::{fs, path::Path};

use criterion::{Criterion, criterion_group, criterion_main};
use hh_autoload::{AutoloadMap, SymbolKind, WriterConfig};
use tempfile::TempDir;

const SYMBOLS_PER_KIND: usize = 2_000;

fn large_project(root: &Path) -> AutoloadMap {
    let mut map = AutoloadMap::new();
    for kind in SymbolKind::ALL {
        let dir = root.join("src").join(kind.as_str());
        fs::create_dir_all(&dir).expect("Failed to create source directory");
        for i in 0..SYMBOLS_PER_KIND {
            // Several symbols per file, as in real projects
            let file = dir.join(format!("file_{}.hack", i / 4));
            if !file.exists() {
                fs::write(&file, "").expect("Failed to write source file");
            }
            map.insert(kind, format!("symbol_{i}"), file);
        }
    }
    map
}

fn benchmark_render(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("vendor")).expect("Failed to create vendor dir");
    let map = large_project(root);

    let writer = WriterConfig::new()
        .root(root)
        .expect("Failed to set root")
        .files(vec![])
        .autoload_map(map)
        .dev(false);
    let destination = root.join("vendor/autoload.hack");

    c.bench_function("render_8000_symbols", |b| {
        b.iter(|| writer.render(&destination).expect("Failed to render"));
    });
}

criterion_group!(benches, benchmark_render);
criterion_main!(benches);
