//! Layered configuration: TOML file, then `FIELDSYNC_*` environment variables.
//!
//! ```toml
//! batch_size = 500
//!
//! [sync]
//! table_prefix    = "account_"
//! multiple_values = true
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FIELDSYNC_SYNC__SEARCH_INDEX=true`.

use std::path::Path;

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use fieldsync_sql::SyncOptions;
use serde::Deserialize;

/// Statements per emitted batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  pub sync:       SyncOptions,
  pub batch_size: usize,
}

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      sync:       SyncOptions::default(),
      batch_size: DEFAULT_BATCH_SIZE,
    }
  }
}

/// Read `path` if it exists, then overlay the environment.
pub fn load(path: &Path) -> anyhow::Result<CliConfig> {
  let builder = Config::builder()
    .add_source(File::from(path).required(false))
    .add_source(
      Environment::with_prefix("FIELDSYNC")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    );
  deserialize(builder)
    .with_context(|| format!("failed to load config from {}", path.display()))
}

fn deserialize(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<CliConfig> {
  let settings = builder.build().context("failed to read config")?;
  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  anyhow::ensure!(cfg.batch_size > 0, "batch_size must be at least 1");
  Ok(cfg)
}
