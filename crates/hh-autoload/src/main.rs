use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use hh_autoload::{
    AutoloadMap, WriterConfig,
    builder::{DEFAULT_MANIFEST_FILE, ManifestBuilder, Merger, StaticBuilder},
    config::Config,
    shims::write_legacy_shims,
    writer::ARTIFACT_FILE_NAME,
};
use log::{LevelFilter, info};

/// Compile a Hack autoload manifest into a bootstrap module
#[derive(Parser, Debug)]
#[command(name = "hh-autoload", version, about, long_about = None)]
struct Cli {
    /// Project root; every mapped file must live below it
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Symbol manifest produced by a scanner [default: <root>/hh_autoload.manifest.toml]
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Directory for the generated files, relative to the root [default: vendor]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Generate a production build
    #[arg(long)]
    no_dev: bool,

    /// Class consulted for symbols missing from the map
    #[arg(long)]
    failure_handler: Option<String>,

    /// Embed the root as an absolute path instead of relative to the output
    #[arg(long)]
    absolute_root: bool,

    /// Skip writing the legacy hh_autoload.php / hh_autoload.hh entry points
    #[arg(long)]
    no_shims: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG, when set, takes precedence over the -v flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Failed to resolve root directory {}", cli.root.display()))?;

    let mut config = Config::load(&root)?;
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    if cli.absolute_root {
        config.relative_root = false;
    }
    let is_dev = !cli.no_dev;

    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_MANIFEST_FILE));
    let extra_files = config.extra_files.iter().map(|file| root.join(file)).collect();
    let builder = Merger::new()
        .with(ManifestBuilder::from_path(&manifest_path, &root)?)
        .with(StaticBuilder::new(extra_files, AutoloadMap::new()));

    let output_dir = root.join(&config.output_dir);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let failure_handler = cli
        .failure_handler
        .as_deref()
        .or_else(|| config.failure_handler_for(is_dev));
    let writer = WriterConfig::new()
        .root(&root)?
        .relative_root(config.relative_root)
        .dev(is_dev)
        .failure_handler(failure_handler)?
        .with_builder(&builder);

    let artifact = writer.emit(&output_dir.join(ARTIFACT_FILE_NAME))?;
    if !cli.no_shims {
        write_legacy_shims(&output_dir, ARTIFACT_FILE_NAME)?;
    }

    info!(
        "Generated {} (build {})",
        artifact.path.display(),
        artifact.build_id
    );
    Ok(())
}

/// Errors are returned from `main` so the chain reaches stderr whatever the
/// log filter is
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}
