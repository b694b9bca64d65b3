use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::db;
use crate::worker::WorkerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Where the task list pages are hosted
  pub origin: String,
  /// Version string of the worker; bump it to invalidate cached assets
  #[serde(default = "default_cache_version")]
  pub cache_version: String,
  /// Resources that must be cached at install time
  #[serde(default = "default_precache")]
  pub precache: Vec<String>,
  pub backend: Option<BackendConfig>,
  /// Override for the data directory (databases, session, logs)
  pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Project URL of the hosted backend, e.g. https://xyz.supabase.co
  pub url: String,
}

fn default_cache_version() -> String {
  "task-manager-v2".to_string()
}

fn default_precache() -> Vec<String> {
  [
    "./",
    "index.html",
    "login.html",
    "style.css",
    "script.js",
    "login.js",
    "supabase.js",
    "favicon.ico",
    "icons/icon-192x192.png",
    "icons/icon-512x512.png",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

/// Parse a base URL so relative paths join beneath it.
fn base_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw).map_err(|e| eyre!("Invalid URL '{}': {}", raw, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./taskcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/taskcache/config.yaml
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
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/taskcache/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("taskcache.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("taskcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    // Fail early on a bad origin rather than at the first request
    config.origin_url()?;
    Ok(config)
  }

  pub fn origin_url(&self) -> Result<Url> {
    base_url(&self.origin)
  }

  pub fn backend_url(&self) -> Result<Url> {
    let backend = self
      .backend
      .as_ref()
      .ok_or_else(|| eyre!("No backend configured. Add a `backend.url` entry to the config."))?;
    base_url(&backend.url)
  }

  pub fn data_dir(&self) -> Result<PathBuf> {
    db::data_dir(self.data_dir.as_deref())
  }

  /// Description of the worker version this build deploys.
  pub fn worker(&self) -> Result<WorkerConfig> {
    Ok(WorkerConfig {
      origin: self.origin_url()?,
      version: self.cache_version.clone(),
      precache: self.precache.clone(),
    })
  }

  /// Get the backend API key from environment variables.
  ///
  /// Checks TASKCACHE_BACKEND_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_backend_key() -> Result<String> {
    std::env::var("TASKCACHE_BACKEND_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!("Backend API key not found. Set TASKCACHE_BACKEND_KEY or SUPABASE_ANON_KEY.")
      })
  }
}
