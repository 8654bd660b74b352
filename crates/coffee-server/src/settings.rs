//! Runtime configuration, read once at startup.
//!
//! Sources, later ones winning: the YAML file given with `--config`
//! (default `config.yml`, skipped when absent), then `COFFEE_*` environment variables with `__`
//! between nesting levels, e.g. `COFFEE_APPWRITE__API_KEY`.

use std::{path::Path, time::Duration};

use coffee_core::{Collections, document::Permissions};
use coffee_store_appwrite::AppwriteConfig;
use config::{ConfigBuilder, builder::DefaultState};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Which [`DocumentStore`](coffee_core::store::DocumentStore) to serve from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Appwrite,
  /// Process-local and empty at start. For development only.
  Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
  pub coffee_bag_collection_id: String,
  pub coffee_cup_collection_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
  #[serde(default)]
  pub api_endpoint:  String,
  #[serde(default)]
  pub project_id:    String,
  #[serde(default)]
  pub api_key:       String,
  #[serde(default)]
  pub default_read:  Vec<String>,
  #[serde(default)]
  pub default_write: Vec<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:  u64,
  pub collections:   CollectionSettings,
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  #[serde(default)]
  pub backend:  Backend,
  pub appwrite: AppwriteSettings,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_timeout_secs() -> u64 { 30 }

impl Settings {
  /// Layer `path` under the `COFFEE_*` environment and validate.
  ///
  /// A missing file is an error only when `required`.
  pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
    let builder = config::Config::builder()
      .add_source(config::File::from(path).required(required))
      .add_source(
        config::Environment::with_prefix("COFFEE")
          .prefix_separator("_")
          .separator("__"),
      );
    Self::from_builder(builder)
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    let c = &self.appwrite.collections;
    let mut required = vec![
      ("appwrite.collections.coffee_bag_collection_id", &c.coffee_bag_collection_id),
      ("appwrite.collections.coffee_cup_collection_id", &c.coffee_cup_collection_id),
    ];
    if self.backend == Backend::Appwrite {
      required.extend([
        ("appwrite.api_endpoint", &self.appwrite.api_endpoint),
        ("appwrite.project_id", &self.appwrite.project_id),
        ("appwrite.api_key", &self.appwrite.api_key),
      ]);
    }

    let missing: Vec<&str> = required
      .into_iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(key, _)| key)
      .collect();
    if !missing.is_empty() {
      return Err(ConfigError::Invalid(format!("missing {}", missing.join(", "))));
    }
    if self.appwrite.timeout_secs == 0 {
      return Err(ConfigError::Invalid("appwrite.timeout_secs must be positive".into()));
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn collections(&self) -> Collections {
    Collections {
      bags: self.appwrite.collections.coffee_bag_collection_id.clone(),
      cups: self.appwrite.collections.coffee_cup_collection_id.clone(),
    }
  }

  pub fn permissions(&self) -> Permissions {
    Permissions {
      read:  self.appwrite.default_read.clone(),
      write: self.appwrite.default_write.clone(),
    }
  }

  pub fn appwrite_config(&self) -> AppwriteConfig {
    AppwriteConfig {
      api_endpoint: self.appwrite.api_endpoint.clone(),
      project_id:   self.appwrite.project_id.clone(),
      api_key:      self.appwrite.api_key.clone(),
      permissions:  self.permissions(),
      timeout:      Duration::from_secs(self.appwrite.timeout_secs),
    }
  }

  /// Human-readable summary with the API key left out.
  pub fn summary(&self) -> String {
    let c = self.collections();
    format!(
      "listen:      {}\nbackend:     {:?}\nendpoint:    {}\nproject:     {}\ncollections: bags={} cups={}",
      self.address(),
      self.backend,
      self.appwrite.api_endpoint,
      self.appwrite.project_id,
      c.bags,
      c.cups,
    )
  }
}
