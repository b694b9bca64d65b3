//! SQLite implementation of the named-cache storage.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::traits::{CacheStorage, CachedResponse, RequestKey, StoredResponse, WorkerSlot};
use crate::db::{self, schema::CACHE_SCHEMA};

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the storage at `<data_dir>/cache.db`.
  pub fn open(data_dir: &Path) -> Result<Self> {
    Self::open_at(&data_dir.join("cache.db"))
  }

  /// Open the storage at an explicit database path.
  pub fn open_at(path: &Path) -> Result<Self> {
    Self::from_connection(db::open_connection(path)?)
  }

  /// Private in-memory storage, mostly for tests.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(db::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    db::run_migrations(&conn, CACHE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

fn ensure_cache(conn: &Connection, cache_name: &str) -> Result<()> {
  conn
    .execute(
      "INSERT OR IGNORE INTO caches (name, created_seq)
       VALUES (?, (SELECT COALESCE(MAX(created_seq), 0) + 1 FROM caches))",
      params![cache_name],
    )
    .map_err(|e| eyre!("Failed to open cache {}: {}", cache_name, e))?;
  Ok(())
}

/// Write one entry. Nothing is written if `cache_name` does not exist.
fn insert_entry(
  conn: &Connection,
  cache_name: &str,
  key: &RequestKey,
  response: &StoredResponse,
) -> Result<()> {
  let headers = serde_json::to_string(&response.headers)
    .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

  let written = conn
    .execute(
      "INSERT OR REPLACE INTO cache_entries
         (cache_name, request_hash, method, url, status, headers, body, cached_at)
       SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now')
       WHERE EXISTS (SELECT 1 FROM caches WHERE name = ?1)",
      params![
        cache_name,
        key.cache_hash(),
        key.method,
        key.url,
        response.status,
        headers,
        response.body
      ],
    )
    .map_err(|e| eyre!("Failed to store {}: {}", key, e))?;
  if written == 0 {
    debug!(cache = cache_name, request = %key, "cache no longer exists, entry dropped");
  }
  Ok(())
}

impl CacheStorage for SqliteStorage {
  fn open(&self, cache_name: &str) -> Result<()> {
    let conn = self.lock()?;
    ensure_cache(&conn, cache_name)
  }

  fn has(&self, cache_name: &str) -> Result<bool> {
    let conn = self.lock()?;
    let found: Option<String> = conn
      .query_row(
        "SELECT name FROM caches WHERE name = ?",
        params![cache_name],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up cache {}: {}", cache_name, e))?;
    Ok(found.is_some())
  }

  fn keys(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT name FROM caches ORDER BY created_seq")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list caches: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read cache name: {}", e))?;

    Ok(names)
  }

  fn delete(&self, cache_name: &str) -> Result<bool> {
    let conn = self.lock()?;
    let removed = conn
      .execute("DELETE FROM caches WHERE name = ?", params![cache_name])
      .map_err(|e| eyre!("Failed to delete cache {}: {}", cache_name, e))?;
    Ok(removed > 0)
  }

  fn match_request(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
    let conn = self.lock()?;

    let row: Option<(u16, String, Vec<u8>, String)> = conn
      .query_row(
        "SELECT status, headers, body, cached_at FROM cache_entries
         WHERE cache_name = ? AND request_hash = ?",
        params![cache_name, key.cache_hash()],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to match {}: {}", key, e))?;

    match row {
      Some((status, headers, body, cached_at_str)) => {
        let headers: Vec<(String, Vec<u8>)> = serde_json::from_str(&headers)
          .map_err(|e| eyre!("Failed to deserialize headers for {}: {}", key, e))?;
        Ok(Some(CachedResponse {
          response: StoredResponse {
            status,
            headers,
            body,
          },
          cached_at: parse_datetime(&cached_at_str)?,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, cache_name: &str, key: &RequestKey, response: &StoredResponse) -> Result<()> {
    let conn = self.lock()?;
    insert_entry(&conn, cache_name, key, response)
  }

  fn put_all(&self, cache_name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<()> {
    let mut conn = self.lock()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    ensure_cache(&tx, cache_name)?;
    for (key, response) in entries {
      insert_entry(&tx, cache_name, key, response)?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;
    Ok(())
  }

  fn requests(&self, cache_name: &str) -> Result<Vec<RequestKey>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT method, url FROM cache_entries WHERE cache_name = ? ORDER BY url")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let keys = stmt
      .query_map(params![cache_name], |row| {
        Ok(RequestKey::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
      })
      .map_err(|e| eyre!("Failed to list entries of {}: {}", cache_name, e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    Ok(keys)
  }

  fn slot(&self, slot: WorkerSlot) -> Result<Option<String>> {
    let conn = self.lock()?;
    conn
      .query_row(
        "SELECT version FROM worker_slots WHERE slot = ?",
        params![slot.as_str()],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read {} slot: {}", slot.as_str(), e))
  }

  fn set_slot(&self, slot: WorkerSlot, version: Option<&str>) -> Result<()> {
    let conn = self.lock()?;
    match version {
      Some(version) => conn.execute(
        "INSERT OR REPLACE INTO worker_slots (slot, version) VALUES (?, ?)",
        params![slot.as_str(), version],
      ),
      None => conn.execute(
        "DELETE FROM worker_slots WHERE slot = ?",
        params![slot.as_str()],
      ),
    }
    .map_err(|e| eyre!("Failed to write {} slot: {}", slot.as_str(), e))?;
    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
