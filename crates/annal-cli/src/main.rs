//! annal command-line generator.
//!
//! Reads `annal.toml` (or the path given with `--config`), loads a JSON
//! schema set, derives history schemas and writes one file per tracked
//! entity into the configured schema directory.
//!
//! ```text
//! annal --schemas schema.json
//! ANNAL__GENERATOR__AUDITING=true annal --schemas schema.json --dry-run
//! ```

use std::path::PathBuf;

use annal_cli::{
  CliConfig,
  emit::{Emitter, JsonRenderer, templates},
  load_schemas,
};
use anyhow::Context as _;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "History schema generator")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "annal.toml")]
  config: PathBuf,

  /// JSON file holding the entity schemas.
  #[arg(short, long)]
  schemas: PathBuf,

  /// Derive and report, but write nothing.
  #[arg(long)]
  dry_run: bool,

  /// Also write the canonical schema set (originals plus history schemas)
  /// to this path.
  #[arg(long)]
  output_set: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ANNAL").separator("__"))
    .build()
    .context("failed to read config file")?;

  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  let schemas = load_schemas(&cli.schemas).with_context(|| {
    format!("failed to load schemas from {}", cli.schemas.display())
  })?;

  tracing::info!(
    templates = ?templates(&cfg.generator),
    "template set"
  );

  let emitter = Emitter::new(
    Box::new(JsonRenderer),
    &cfg.generator.schema_path,
    &cfg.output.extension,
  );

  if !cli.dry_run {
    let removed = emitter
      .remove_old_generated(&schemas)
      .context("failed to remove stale history schemas")?;
    tracing::debug!(removed, "cleared previous output");
  }

  let generation = annal_schema::generate(schemas, cfg.generator.clone())
    .await
    .context("history generation failed")?;

  if cli.dry_run {
    for ctx in &generation.contexts {
      println!("{} -> {}", ctx.schema.name, ctx.table_name);
    }
    return Ok(());
  }

  let written = emitter
    .emit(&generation)
    .context("failed to write history schemas")?;
  for path in &written {
    tracing::info!("wrote {}", path.display());
  }

  if let Some(path) = cli.output_set {
    let body = serde_json::to_string_pretty(&generation.schemas)?;
    std::fs::write(&path, body)
      .with_context(|| format!("failed to write {}", path.display()))?;
  }

  Ok(())
}
