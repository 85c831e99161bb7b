//! Runtime configuration.
//!
//! Read from an optional TOML file, then overridden by `SHARELIST_*`
//! environment variables (`__` separates nested keys, e.g.
//! `SHARELIST_HASHING__MEMORY_KIB`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "SHARELIST";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:          PathBuf,
  /// How many fresh share codes to try before giving up on a new list.
  pub share_code_attempts: u32,
  pub hashing:             HashingConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path:          PathBuf::from("shopping_list.db"),
      share_code_attempts: 3,
      hashing:             HashingConfig::default(),
    }
  }
}

/// argon2 cost parameters for newly hashed passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
  pub memory_kib:  u32,
  pub iterations:  u32,
  pub parallelism: u32,
}

impl Default for HashingConfig {
  fn default() -> Self {
    Self {
      memory_kib:  argon2::Params::DEFAULT_M_COST,
      iterations:  argon2::Params::DEFAULT_T_COST,
      parallelism: argon2::Params::DEFAULT_P_COST,
    }
  }
}

impl HashingConfig {
  /// The smallest parameters argon2 accepts. For tests only.
  pub fn cheap() -> Self {
    Self {
      memory_kib:  argon2::Params::MIN_M_COST,
      iterations:  argon2::Params::MIN_T_COST,
      parallelism: argon2::Params::MIN_P_COST,
    }
  }
}

impl AppConfig {
  /// Layer `file` (if it exists) under the environment.
  pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path.to_path_buf()).required(false));
    }
    builder
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~/` expanded to the home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
