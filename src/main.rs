//! `sw-manifest` command line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sw_manifest::generator::DEFAULT_HASH_CONCURRENCY;
use sw_manifest::{Config, DirectoryFilesystem, Filesystem, ManifestGenerator};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Generate a cache manifest for a build output directory.
#[derive(Debug, Parser)]
#[command(name = "sw-manifest", version, about)]
struct Cli {
  /// Build output directory to scan; the manifest is written here.
  dist_dir: PathBuf,

  /// Caching configuration file (JSON, or YAML with a .yaml/.yml extension).
  config: PathBuf,

  /// Base href all manifest URLs are resolved against.
  #[arg(long, default_value = "/")]
  base_href: String,

  /// Manifest file name, relative to the output directory.
  #[arg(long, default_value = "ngsw.json")]
  output: String,

  /// Maximum number of files hashed concurrently.
  #[arg(long, default_value_t = DEFAULT_HASH_CONCURRENCY)]
  hash_concurrency: usize,

  /// Increase log verbosity (-v info, -vv debug).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("Error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let default_level = match verbose {
    0 => "sw_manifest=warn",
    1 => "sw_manifest=info",
    _ => "sw_manifest=debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .with_writer(std::io::stderr)
    .init();
}

async fn run(cli: Cli) -> Result<()> {
  let config = Config::from_path(&cli.config)
    .with_context(|| format!("failed to load {}", cli.config.display()))?;
  debug!("Loaded configuration from {}", cli.config.display());

  let output = format!("/{}", cli.output.trim_start_matches('/'));
  let filesystem = DirectoryFilesystem::new(&cli.dist_dir).ignoring(output.clone());
  let generator =
    ManifestGenerator::new(filesystem, cli.base_href).with_hash_concurrency(cli.hash_concurrency);

  let manifest = generator
    .process(&config)
    .await
    .with_context(|| format!("failed to generate manifest for {}", cli.dist_dir.display()))?;

  let json = serde_json::to_string_pretty(&manifest).context("failed to serialise manifest")?;
  generator.filesystem().write(&output, &json).await?;
  info!("Wrote {}", cli.dist_dir.join(output.trim_start_matches('/')).display());

  Ok(())
}
