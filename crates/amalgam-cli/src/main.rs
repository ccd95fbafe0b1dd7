use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use amalgam_core::{GitCli, Provenance};
use amalgamate::{Generator, Manifest, Staleness};

#[derive(Parser)]
#[command(name = "amalgamate")]
#[command(about = "Regenerate single-header distributions from headers and sources", long_about = None)]
struct Cli {
    /// Project root containing the module files
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Manifest file (defaults to <root>/amalgamate.toml, then built-in targets)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Report stale artifacts instead of writing them
    #[arg(long)]
    check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Project root not found: {:?}", cli.root))?;
    let manifest = Manifest::load(&root, cli.manifest.as_deref())?;

    let provenance = Provenance::resolve(&GitCli::new(&root));
    info!(
        "Provenance: commit {} at {}",
        provenance.revision(),
        provenance.timestamp()
    );

    let generator = Generator::new(&root, &manifest, &provenance);

    if cli.check {
        let artifacts = generator.render_all()?;
        let stale = generator.check(&artifacts)?;
        if stale.is_empty() {
            println!("All {} artifacts are up to date.", artifacts.len());
            return Ok(());
        }
        let summary = stale
            .iter()
            .map(|s| match s.staleness {
                Staleness::Missing => format!("{} (missing)", s.path.display()),
                Staleness::Differs => format!("{} (out of date)", s.path.display()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!("{} artifact(s) need regeneration: {}", stale.len(), summary);
    }

    generator.run()?;
    println!("Done!");
    Ok(())
}
