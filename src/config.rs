use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default product API
pub const DEFAULT_API_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  pub pagination: PaginationConfig,
  pub cache: CacheConfig,
  pub search: SearchConfig,
  pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub url: String,
  /// Per-request timeout
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_API_URL.to_string(),
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
  pub page_size: u64,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    Self { page_size: 10 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long a fetched value counts as fresh
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { stale_secs: 5 * 60 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  pub debounce_ms: u64,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self { debounce_ms: 300 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
  pub ttl_secs: u64,
}

impl Default for NotificationsConfig {
  fn default() -> Self {
    Self { ttl_secs: 3 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./p9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/p9s/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("p9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("p9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Apply environment overrides.
  ///
  /// Checks P9S_API_URL.
  pub fn with_env(self) -> Self {
    self.with_api_url(std::env::var("P9S_API_URL").ok())
  }

  fn with_api_url(mut self, url: Option<String>) -> Self {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
      self.api.url = url;
    }
    self
  }

  /// Check values that would make the client misbehave
  pub fn validate(&self) -> Result<()> {
    url::Url::parse(&self.api.url).map_err(|e| eyre!("Invalid api.url {:?}: {}", self.api.url, e))?;
    if self.pagination.page_size == 0 {
      return Err(eyre!("pagination.page_size must be at least 1"));
    }
    Ok(())
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.cache.stale_secs)
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.search.debounce_ms)
  }

  pub fn notice_ttl(&self) -> Duration {
    Duration::from_secs(self.notifications.ttl_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.url, "https://dummyjson.com");
    assert_eq!(config.pagination.page_size, 10);
    assert_eq!(config.stale_time(), Duration::from_secs(300));
    assert_eq!(config.debounce(), Duration::from_millis(300));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_file_keeps_other_defaults() {
    let config = Config::parse(
      "api:\n  url: http://localhost:3000\ntitle: Staging\nsearch:\n  debounce_ms: 150\n",
    )
    .unwrap();

    assert_eq!(config.api.url, "http://localhost:3000");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.title.as_deref(), Some("Staging"));
    assert_eq!(config.debounce(), Duration::from_millis(150));
    assert_eq!(config.notice_ttl(), Duration::from_secs(3));
  }

  #[test]
  fn test_empty_file() {
    let config = Config::parse("\n").unwrap();
    assert_eq!(config.cache.stale_secs, 300);
  }

  #[test]
  fn test_bad_yaml() {
    assert!(Config::parse("pagination: [1, 2").is_err());
  }

  #[test]
  fn test_api_url_override() {
    let config = Config::default().with_api_url(Some("http://127.0.0.1:8080".to_string()));
    assert_eq!(config.api.url, "http://127.0.0.1:8080");

    let config = config.with_api_url(Some("  ".to_string()));
    assert_eq!(config.api.url, "http://127.0.0.1:8080");
  }

  #[test]
  fn test_validate() {
    let mut config = Config::default();
    config.api.url = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.pagination.page_size = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    assert!(Config::load(Some(Path::new("/nonexistent/p9s.yaml"))).is_err());
  }
}
