//! Server settings, layered from a TOML file and `REGISTRY_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8000,
      store_path: PathBuf::from("registry.db"),
    }
  }
}

impl ServerConfig {
  /// Read `path` (optional) and the environment over the built-in defaults.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let defaults = Self::default();
    let settings = config::Config::builder()
      .set_default("host", defaults.host)?
      .set_default("port", i64::from(defaults.port))?
      .set_default("store_path", defaults.store_path.to_string_lossy().into_owned())?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("REGISTRY"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
