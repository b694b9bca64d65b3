pub mod schema;

use color_eyre::{eyre::eyre, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Resolve the data directory, honouring an explicit override.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
  if let Some(dir) = override_dir {
    return Ok(dir.to_path_buf());
  }

  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("taskcache"))
}

/// Open or create a database file, creating its parent directory if needed.
pub fn open_connection(path: &Path) -> Result<Connection> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
  }

  let conn = Connection::open(path)
    .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;
  prepare(conn)
}

/// Open a private in-memory database.
#[cfg(test)]
pub fn open_in_memory() -> Result<Connection> {
  let conn =
    Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
  prepare(conn)
}

fn prepare(conn: Connection) -> Result<Connection> {
  // Cascading deletes from caches to cache_entries depend on this
  conn
    .execute_batch("PRAGMA foreign_keys = ON;")
    .map_err(|e| eyre!("Failed to enable foreign keys: {}", e))?;
  Ok(conn)
}

/// Run a schema batch against a connection.
pub fn run_migrations(conn: &Connection, schema: &str) -> Result<()> {
  conn
    .execute_batch(schema)
    .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
  Ok(())
}
