//! Runtime server configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variables with this prefix override the file, e.g.
/// `TRAVELS_PORT=8080` or `TRAVELS_ARCHIVE_PATH=/data/data.zip`.
pub const ENV_PREFIX: &str = "TRAVELS";

/// Server configuration, deserialised from `config.toml` and the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// Zip file or directory holding the dataset members.
  pub archive_path: PathBuf,
}

impl ServerConfig {
  /// Layer defaults, the optional TOML file at `path`, and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 80)?
      .set_default("archive_path", "/tmp/data/data.zip")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
