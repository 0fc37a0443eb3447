//! Server configuration, deserialised from `census.toml` and `CENSUS_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use census_api::ApiConfig;
use census_core::store::StatisticsRefresh;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  #[serde(default = "default_search_timeout_secs")]
  pub search_timeout_secs: u64,
  #[serde(default)]
  pub statistics_refresh:  StatisticsRefresh,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("census.db") }

fn default_search_timeout_secs() -> u64 { 60 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      search_timeout:     Duration::from_secs(self.search_timeout_secs),
      statistics_refresh: self.statistics_refresh,
    }
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn load(toml: &str) -> ServerConfig {
    ::config::Config::builder()
      .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_source_uses_defaults() {
    let cfg = load("");
    assert_eq!(cfg.address(), "0.0.0.0:3000");
    assert_eq!(cfg.store_path, PathBuf::from("census.db"));
    assert_eq!(cfg.search_timeout_secs, 60);
    assert_eq!(cfg.statistics_refresh, StatisticsRefresh::Transactional);
  }

  #[test]
  fn overrides_flow_into_api_config() {
    let cfg = load(
      r#"
        port = 8080
        search_timeout_secs = 5
        statistics_refresh = "detached"
      "#,
    );
    let api = cfg.api_config();
    assert_eq!(cfg.port, 8080);
    assert_eq!(api.search_timeout, Duration::from_secs(5));
    assert_eq!(api.statistics_refresh, StatisticsRefresh::Detached);
  }

  #[test]
  fn absolute_store_path_is_left_alone() {
    assert_eq!(
      expand_tilde(Path::new("/var/lib/census.db")),
      PathBuf::from("/var/lib/census.db")
    );
  }
}
