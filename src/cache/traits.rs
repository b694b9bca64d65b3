//! Core traits and types for the response cache.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of a cached request: method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
  pub method: String,
  pub url: String,
}

impl RequestKey {
  pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      method: method.into().to_uppercase(),
      url: url.into(),
    }
  }

  #[cfg(test)]
  pub fn get(url: impl Into<String>) -> Self {
    Self::new("GET", url)
  }

  /// Stable, fixed-length storage key for this request.
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl std::fmt::Display for RequestKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.method, self.url)
  }
}

/// A response as stored and replayed verbatim.
///
/// Header values are kept as raw bytes since HTTP allows values that are
/// not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
  pub status: u16,
  pub headers: Vec<(String, Vec<u8>)>,
  pub body: Vec<u8>,
}

impl StoredResponse {
  #[cfg(test)]
  pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      status,
      headers: Vec::new(),
      body: body.into(),
    }
  }

  #[cfg(test)]
  pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  /// Status in the 200-299 range.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Look up a header value, case-insensitively. Values that are not UTF-8
  /// are skipped.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .and_then(|(_, v)| std::str::from_utf8(v).ok())
  }
}

/// A response read back from a named cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
  pub response: StoredResponse,
  /// When the entry was last written
  pub cached_at: DateTime<Utc>,
}

/// Worker version bookkeeping slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSlot {
  /// Installed, waiting to take control
  Waiting,
  /// Currently controlling and serving requests
  Active,
}

impl WorkerSlot {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkerSlot::Waiting => "waiting",
      WorkerSlot::Active => "active",
    }
  }
}

/// Indicates where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh response from the network (cache miss)
  Network,
  /// Cached response, a background refresh is in flight
  Cache,
  /// Non-GET request forwarded without touching the cache
  Passthrough,
}

/// Trait for named-cache storage backends.
///
/// Individual operations are atomic per key; callers get last-writer-wins
/// semantics for concurrent writes to the same request.
pub trait CacheStorage: Send + Sync {
  /// Create the named cache if it does not exist.
  fn open(&self, cache_name: &str) -> Result<()>;

  /// Whether a named cache exists.
  fn has(&self, cache_name: &str) -> Result<bool>;

  /// Names of all caches, oldest first.
  fn keys(&self) -> Result<Vec<String>>;

  /// Delete a named cache with all its entries. Returns false if it did not exist.
  fn delete(&self, cache_name: &str) -> Result<bool>;

  /// Look up a stored response.
  fn match_request(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CachedResponse>>;

  /// Store a response, replacing any previous entry. Does nothing when the
  /// cache does not exist; only `open` and `put_all` create caches.
  fn put(&self, cache_name: &str, key: &RequestKey, response: &StoredResponse) -> Result<()>;

  /// Store several responses in one step; either all are stored or none.
  fn put_all(&self, cache_name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<()>;

  /// Request keys stored in a cache.
  fn requests(&self, cache_name: &str) -> Result<Vec<RequestKey>>;

  /// Read a worker version slot.
  fn slot(&self, slot: WorkerSlot) -> Result<Option<String>>;

  /// Set or clear a worker version slot.
  fn set_slot(&self, slot: WorkerSlot, version: Option<&str>) -> Result<()>;
}
