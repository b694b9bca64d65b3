use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub email: Option<String>,
}

/// Signed-in session against the hosted backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub refresh_token: String,
  pub expires_at: DateTime<Utc>,
  pub user: User,
}

impl Session {
  pub fn is_expired(&self) -> bool {
    Utc::now() >= self.expires_at
  }
}

/// Persists the current session as JSON on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
  path: PathBuf,
}

impl SessionStore {
  /// Store at `<data_dir>/session.json`.
  pub fn new(data_dir: &Path) -> Self {
    Self {
      path: data_dir.join("session.json"),
    }
  }

  /// The saved session, or None if absent or expired.
  pub fn load(&self) -> Result<Option<Session>> {
    if !self.path.exists() {
      return Ok(None);
    }

    let contents = std::fs::read_to_string(&self.path)
      .map_err(|e| eyre!("Failed to read session {}: {}", self.path.display(), e))?;
    let session: Session = serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse session {}: {}", self.path.display(), e))?;

    if session.is_expired() {
      debug!("stored session expired");
      return Ok(None);
    }
    Ok(Some(session))
  }

  pub fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(session)
      .map_err(|e| eyre!("Failed to serialize session: {}", e))?;
    std::fs::write(&self.path, contents)
      .map_err(|e| eyre!("Failed to write session {}: {}", self.path.display(), e))
  }

  pub fn clear(&self) -> Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(eyre!("Failed to remove session {}: {}", self.path.display(), e)),
    }
  }
}
