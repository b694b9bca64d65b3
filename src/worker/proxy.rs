//! Offline cache proxy with stale-while-revalidate interception.

use color_eyre::Result;
use reqwest::Method;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::lifecycle::{Lifecycle, LifecycleError, WorkerState};
use super::network::{Network, NetworkError, Request};
use crate::cache::{CacheSource, CacheStorage, RequestKey, StoredResponse, WorkerSlot};

/// Static description of one worker version.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
  /// Base URL relative paths resolve against
  pub origin: Url,
  /// Version string, also the name of this version's cache
  pub version: String,
  /// Paths that must be cached once install completes
  pub precache: Vec<String>,
}

/// Reasons an install aborts. Every one of them is fatal for the version.
#[derive(Debug, Error)]
pub enum InstallError {
  #[error("precache fetch of {path} failed: {source}")]
  Fetch {
    path: String,
    #[source]
    source: NetworkError,
  },

  #[error("precache fetch of {path} returned status {status}")]
  Status { path: String, status: u16 },

  #[error("invalid precache path {path}")]
  InvalidPath { path: String },

  #[error("cache storage failed during install: {0}")]
  Storage(String),

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),
}

/// Handle on a background network refresh.
///
/// Dropping it detaches the task; the refresh still runs to completion.
#[derive(Debug)]
pub struct Revalidation {
  handle: JoinHandle<Result<StoredResponse, NetworkError>>,
}

impl Revalidation {
  /// Wait until the network fetch (and its cache write) has finished.
  pub async fn wait(self) -> Result<StoredResponse, NetworkError> {
    self
      .handle
      .await
      .map_err(|e| NetworkError::Aborted(e.to_string()))?
  }
}

/// Outcome of intercepting a request.
#[derive(Debug)]
pub struct Intercepted {
  pub response: StoredResponse,
  pub source: CacheSource,
  /// Present when a cached response was served while the network refresh runs
  pub revalidation: Option<Revalidation>,
}

/// One worker version: owns a named cache and answers intercepted requests.
pub struct CacheProxy<S: CacheStorage + 'static> {
  storage: Arc<S>,
  network: Arc<dyn Network>,
  config: WorkerConfig,
  lifecycle: Lifecycle,
}

impl<S: CacheStorage + 'static> CacheProxy<S> {
  /// A fresh worker version that still has to install.
  pub fn new(storage: Arc<S>, network: Arc<dyn Network>, config: WorkerConfig) -> Self {
    Self {
      storage,
      network,
      config,
      lifecycle: Lifecycle::new(WorkerState::Parsed),
    }
  }

  /// Restore whichever version was last activated, if any.
  pub fn resume(storage: Arc<S>, network: Arc<dyn Network>, origin: Url) -> Result<Option<Self>> {
    let Some(version) = storage.slot(WorkerSlot::Active)? else {
      return Ok(None);
    };

    Ok(Some(Self {
      storage,
      network,
      config: WorkerConfig {
        origin,
        version,
        precache: Vec::new(),
      },
      lifecycle: Lifecycle::new(WorkerState::Activated),
    }))
  }

  /// Pick up a version installed by an earlier run that has not activated yet.
  pub fn waiting(
    storage: Arc<S>,
    network: Arc<dyn Network>,
    config: WorkerConfig,
  ) -> Result<Option<Self>> {
    if storage.slot(WorkerSlot::Waiting)?.as_deref() != Some(config.version.as_str()) {
      return Ok(None);
    }

    Ok(Some(Self {
      storage,
      network,
      config,
      lifecycle: Lifecycle::new(WorkerState::Installed),
    }))
  }

  pub fn cache_name(&self) -> &str {
    &self.config.version
  }

  pub fn state(&self) -> WorkerState {
    self.lifecycle.state()
  }

  /// Resolve a page-relative path against the origin.
  pub fn resolve(&self, path: &str) -> Result<Url, NetworkError> {
    self
      .config
      .origin
      .join(path)
      .map_err(|_| NetworkError::InvalidUrl(path.to_string()))
  }

  /// Fetch every precache entry and store them in this version's cache.
  ///
  /// On failure the version becomes redundant and a cache created by this
  /// attempt is removed again; the previously active version is untouched.
  pub async fn install(&self) -> Result<(), InstallError> {
    self.lifecycle.advance(WorkerState::Installing)?;

    let result = self.precache().await.and_then(|count| {
      self
        .storage
        .set_slot(WorkerSlot::Waiting, Some(self.cache_name()))
        .map(|_| count)
        .map_err(|e| InstallError::Storage(e.to_string()))
    });

    match result {
      Ok(count) => {
        self.lifecycle.advance(WorkerState::Installed)?;
        info!(version = self.cache_name(), entries = count, "worker installed");
        Ok(())
      }
      Err(e) => {
        self.lifecycle.advance(WorkerState::Redundant)?;
        warn!(version = self.cache_name(), error = %e, "worker install failed");
        Err(e)
      }
    }
  }

  async fn precache(&self) -> Result<usize, InstallError> {
    let storage_err = |e: color_eyre::Report| InstallError::Storage(e.to_string());
    let name = self.cache_name();

    let existed = self.storage.has(name).map_err(storage_err)?;
    self.storage.open(name).map_err(storage_err)?;

    let result = self.fetch_manifest().await.and_then(|entries| {
      self
        .storage
        .put_all(name, &entries)
        .map(|_| entries.len())
        .map_err(storage_err)
    });

    if result.is_err() && !existed {
      if let Err(e) = self.storage.delete(name) {
        warn!(cache = name, error = %e, "failed to remove cache of aborted install");
      }
    }
    result
  }

  async fn fetch_manifest(&self) -> Result<Vec<(RequestKey, StoredResponse)>, InstallError> {
    let requests = self
      .config
      .precache
      .iter()
      .map(|path| {
        self
          .resolve(path)
          .map(|url| (path.as_str(), Request::get(url)))
          .map_err(|_| InstallError::InvalidPath { path: path.clone() })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let fetches = requests.into_iter().map(|(path, request)| async move {
      let response = self
        .network
        .fetch(&request)
        .await
        .map_err(|source| InstallError::Fetch {
          path: path.to_string(),
          source,
        })?;

      if !response.is_success() {
        return Err(InstallError::Status {
          path: path.to_string(),
          status: response.status,
        });
      }
      Ok((request.key(), response))
    });

    futures::future::try_join_all(fetches).await
  }

  /// Take control: delete every cache that does not belong to this version.
  ///
  /// Returns the names of the caches that were removed.
  pub fn activate(&self) -> Result<Vec<String>> {
    self.lifecycle.advance(WorkerState::Activating)?;

    let names = match self.storage.keys() {
      Ok(names) => names,
      Err(e) => {
        warn!(error = %e, "failed to enumerate caches");
        Vec::new()
      }
    };

    let mut deleted = Vec::new();
    for name in names.into_iter().filter(|n| n != self.cache_name()) {
      match self.storage.delete(&name) {
        Ok(_) => {
          debug!(cache = %name, "deleted old cache");
          deleted.push(name);
        }
        Err(e) => warn!(cache = %name, error = %e, "failed to delete old cache"),
      }
    }

    // Control passes to this version even if the slots cannot be saved
    if let Err(e) = self
      .storage
      .set_slot(WorkerSlot::Active, Some(self.cache_name()))
      .and_then(|_| self.storage.set_slot(WorkerSlot::Waiting, None))
    {
      warn!(version = self.cache_name(), error = %e, "failed to record active version");
    }
    self.lifecycle.advance(WorkerState::Activated)?;

    info!(version = self.cache_name(), removed = deleted.len(), "worker activated");
    Ok(deleted)
  }

  /// Answer a page request.
  ///
  /// Non-GET requests, and any request while this version is not in control,
  /// go straight to the network. GET requests are served from the cache when
  /// possible while the same request is refreshed from the network in the
  /// background; a 200 response replaces the cached copy.
  pub async fn intercept(&self, request: Request) -> Result<Intercepted, NetworkError> {
    if request.method != Method::GET || self.state() != WorkerState::Activated {
      debug!(method = %request.method, url = %request.url, "passing request through");
      let response = self.network.fetch(&request).await?;
      return Ok(Intercepted {
        response,
        source: CacheSource::Passthrough,
        revalidation: None,
      });
    }

    let key = request.key();
    let revalidation = self.revalidate(request);

    let cached = match self.storage.match_request(self.cache_name(), &key) {
      Ok(cached) => cached,
      Err(e) => {
        warn!(request = %key, error = %e, "cache lookup failed");
        None
      }
    };

    match cached {
      Some(cached) => {
        debug!(request = %key, cached_at = %cached.cached_at, "serving from cache");
        Ok(Intercepted {
          response: cached.response,
          source: CacheSource::Cache,
          revalidation: Some(revalidation),
        })
      }
      None => {
        let response = revalidation.wait().await?;
        Ok(Intercepted {
          response,
          source: CacheSource::Network,
          revalidation: None,
        })
      }
    }
  }

  fn revalidate(&self, request: Request) -> Revalidation {
    let storage = Arc::clone(&self.storage);
    let network = Arc::clone(&self.network);
    let cache_name = self.cache_name().to_string();

    let handle = tokio::spawn(async move {
      let response = match network.fetch(&request).await {
        Ok(response) => response,
        Err(e) => {
          debug!(url = %request.url, error = %e, "network fetch failed");
          return Err(e);
        }
      };

      if response.status == 200 {
        if let Err(e) = storage.put(&cache_name, &request.key(), &response) {
          warn!(url = %request.url, error = %e, "failed to update cache");
        }
      }
      Ok(response)
    });

    Revalidation { handle }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CachedResponse, SqliteStorage};
  use crate::worker::mock::MockNetwork;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::time::Duration;

  const ORIGIN: &str = "https://tasks.example.com/";

  fn config(version: &str, precache: &[&str]) -> WorkerConfig {
    WorkerConfig {
      origin: Url::parse(ORIGIN).unwrap(),
      version: version.to_string(),
      precache: precache.iter().map(|p| p.to_string()).collect(),
    }
  }

  fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
  }

  async fn activated(
    storage: &Arc<SqliteStorage>,
    network: &Arc<MockNetwork>,
    version: &str,
  ) -> CacheProxy<SqliteStorage> {
    let proxy = CacheProxy::new(storage.clone(), network.clone(), config(version, &[]));
    proxy.install().await.unwrap();
    proxy.activate().unwrap();
    proxy
  }

  #[tokio::test]
  async fn test_install_caches_every_manifest_entry() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    network.respond(&url("/").to_string(), StoredResponse::new(200, "index"));
    network.respond(
      &url("/a.css").to_string(),
      StoredResponse::new(200, "css").with_header("content-type", "text/css"),
    );

    let proxy = CacheProxy::new(storage.clone(), network.clone(), config("v1", &["/", "/a.css"]));
    proxy.install().await.unwrap();

    assert_eq!(proxy.state(), WorkerState::Installed);
    for path in ["/", "/a.css"] {
      let key = RequestKey::get(url(path).as_str());
      assert!(storage.match_request("v1", &key).unwrap().is_some(), "{path}");
    }
    assert_eq!(storage.slot(WorkerSlot::Waiting).unwrap().as_deref(), Some("v1"));
  }

  #[tokio::test]
  async fn test_install_fails_on_not_found() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    network.respond(&url("/").to_string(), StoredResponse::new(200, "index"));

    let proxy = CacheProxy::new(storage.clone(), network.clone(), config("v2", &["/", "/a.css"]));
    let err = proxy.install().await.unwrap_err();

    assert!(matches!(err, InstallError::Status { status: 404, .. }));
    assert_eq!(proxy.state(), WorkerState::Redundant);
    assert!(!storage.has("v2").unwrap());
    assert_eq!(storage.slot(WorkerSlot::Waiting).unwrap(), None);
    assert!(proxy.activate().is_err());
  }

  #[tokio::test]
  async fn test_failed_install_keeps_previous_version_serving() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let old = activated(&storage, &network, "v1").await;
    storage
      .put("v1", &RequestKey::get(url("/").as_str()), &StoredResponse::new(200, "old"))
      .unwrap();

    network.set_offline(true);
    let next = CacheProxy::new(storage.clone(), network.clone(), config("v2", &["/"]));
    assert!(matches!(
      next.install().await,
      Err(InstallError::Fetch { .. })
    ));

    assert_eq!(storage.keys().unwrap(), vec!["v1"]);
    let served = old.intercept(Request::get(url("/"))).await.unwrap();
    assert_eq!(served.response.body, b"old");
  }

  #[tokio::test]
  async fn test_activate_removes_other_caches() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    activated(&storage, &network, "v1").await;
    storage.open("stray").unwrap();

    let next = CacheProxy::new(storage.clone(), network.clone(), config("v2", &[]));
    next.install().await.unwrap();
    let mut deleted = next.activate().unwrap();
    deleted.sort();

    assert_eq!(deleted, vec!["stray", "v1"]);
    assert_eq!(storage.keys().unwrap(), vec!["v2"]);
    assert_eq!(storage.slot(WorkerSlot::Active).unwrap().as_deref(), Some("v2"));
    assert_eq!(storage.slot(WorkerSlot::Waiting).unwrap(), None);
  }

  #[tokio::test]
  async fn test_miss_then_offline_hit() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let proxy = activated(&storage, &network, "v1").await;
    network.respond(&url("/a.css").to_string(), StoredResponse::new(200, "B"));

    let first = proxy.intercept(Request::get(url("/a.css"))).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(first.response.body, b"B");

    network.set_offline(true);
    let second = proxy.intercept(Request::get(url("/a.css"))).await.unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(second.response.body, b"B");
    assert!(second.revalidation.unwrap().wait().await.is_err());
  }

  #[tokio::test]
  async fn test_cached_response_does_not_wait_for_network() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::gated());
    let proxy = CacheProxy::new(storage.clone(), network.clone(), config("v1", &[]));
    proxy.install().await.unwrap();
    proxy.activate().unwrap();

    let key = RequestKey::get(url("/a.css").as_str());
    storage
      .put(
        "v1",
        &key,
        &StoredResponse::new(200, "stale").with_header("etag", "\"1\""),
      )
      .unwrap();
    let latest = StoredResponse::new(200, "fresh")
      .with_header("content-type", "text/css")
      .with_header("etag", "\"2\"");
    network.respond(&url("/a.css").to_string(), latest.clone());

    let served = tokio::time::timeout(
      Duration::from_secs(1),
      proxy.intercept(Request::get(url("/a.css"))),
    )
    .await
    .expect("cached response must not block on the network")
    .unwrap();
    assert_eq!(served.response.body, b"stale");

    network.release(1);
    let fresh = served.revalidation.unwrap().wait().await.unwrap();
    assert_eq!(fresh, latest);

    let cached = storage.match_request("v1", &key).unwrap().unwrap();
    assert_eq!(cached.response, latest);
    assert_eq!(cached.response.header("etag"), Some("\"2\""));
  }

  #[tokio::test]
  async fn test_late_refresh_does_not_revive_old_cache() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::gated());
    let old = CacheProxy::new(storage.clone(), network.clone(), config("v1", &[]));
    old.install().await.unwrap();
    old.activate().unwrap();

    let key = RequestKey::get(url("/a.css").as_str());
    storage.put("v1", &key, &StoredResponse::new(200, "stale")).unwrap();
    network.respond(&url("/a.css").to_string(), StoredResponse::new(200, "fresh"));
    let served = old.intercept(Request::get(url("/a.css"))).await.unwrap();
    assert_eq!(served.source, CacheSource::Cache);

    let next = CacheProxy::new(storage.clone(), network.clone(), config("v2", &[]));
    next.install().await.unwrap();
    next.activate().unwrap();
    assert_eq!(storage.keys().unwrap(), vec!["v2"]);

    network.release(1);
    let fresh = served.revalidation.unwrap().wait().await.unwrap();
    assert_eq!(fresh.body, b"fresh");

    assert_eq!(storage.keys().unwrap(), vec!["v2"]);
    assert!(storage.match_request("v1", &key).unwrap().is_none());
  }

  #[tokio::test]
  async fn test_non_200_does_not_overwrite() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let proxy = activated(&storage, &network, "v1").await;
    let key = RequestKey::get(url("/gone").as_str());
    storage.put("v1", &key, &StoredResponse::new(200, "kept")).unwrap();

    let served = proxy.intercept(Request::get(url("/gone"))).await.unwrap();
    let refreshed = served.revalidation.unwrap().wait().await.unwrap();

    assert_eq!(refreshed.status, 404);
    let cached = storage.match_request("v1", &key).unwrap().unwrap();
    assert_eq!(cached.response.body, b"kept");
  }

  #[tokio::test]
  async fn test_miss_with_error_status_is_returned_but_not_cached() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let proxy = activated(&storage, &network, "v1").await;

    let served = proxy.intercept(Request::get(url("/missing"))).await.unwrap();

    assert_eq!(served.response.status, 404);
    assert!(storage.requests("v1").unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_miss_while_offline_fails() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let proxy = activated(&storage, &network, "v1").await;
    network.set_offline(true);

    let err = proxy.intercept(Request::get(url("/a.css"))).await.unwrap_err();
    assert!(matches!(err, NetworkError::Transport { .. }));
  }

  #[tokio::test]
  async fn test_non_get_never_touches_cache() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let proxy = activated(&storage, &network, "v1").await;
    let key = RequestKey::get(url("/api").as_str());
    let seeded = StoredResponse::new(200, "cached").with_header("content-type", "text/plain");
    storage.put("v1", &key, &seeded).unwrap();
    let before = storage.match_request("v1", &key).unwrap().unwrap();
    network.respond(
      &url("/api").to_string(),
      StoredResponse::new(201, "ok").with_header("content-type", "application/json"),
    );

    for method in [Method::POST, Method::PUT, Method::DELETE] {
      let served = proxy
        .intercept(Request::new(method, url("/api")).with_body("{}"))
        .await
        .unwrap();
      assert_eq!(served.source, CacheSource::Passthrough);
      assert!(served.revalidation.is_none());
    }

    assert_eq!(storage.requests("v1").unwrap(), vec![key.clone()]);
    let after = storage.match_request("v1", &key).unwrap().unwrap();
    assert_eq!(after.response, seeded);
    assert_eq!(after.cached_at, before.cached_at);
    assert_eq!(network.calls().len(), 3);
  }

  #[tokio::test]
  async fn test_uncontrolled_worker_passes_through() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    network.respond(&url("/a.css").to_string(), StoredResponse::new(200, "B"));
    let proxy = CacheProxy::new(storage.clone(), network.clone(), config("v1", &[]));

    let served = proxy.intercept(Request::get(url("/a.css"))).await.unwrap();

    assert_eq!(served.source, CacheSource::Passthrough);
    assert!(!storage.has("v1").unwrap());
  }

  /// Storage whose slot writes can be made to fail.
  struct BrokenSlots {
    inner: SqliteStorage,
    fail: AtomicBool,
  }

  impl CacheStorage for BrokenSlots {
    fn open(&self, cache_name: &str) -> Result<()> {
      self.inner.open(cache_name)
    }
    fn has(&self, cache_name: &str) -> Result<bool> {
      self.inner.has(cache_name)
    }
    fn keys(&self) -> Result<Vec<String>> {
      self.inner.keys()
    }
    fn delete(&self, cache_name: &str) -> Result<bool> {
      self.inner.delete(cache_name)
    }
    fn match_request(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
      self.inner.match_request(cache_name, key)
    }
    fn put(&self, cache_name: &str, key: &RequestKey, response: &StoredResponse) -> Result<()> {
      self.inner.put(cache_name, key, response)
    }
    fn put_all(&self, cache_name: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<()> {
      self.inner.put_all(cache_name, entries)
    }
    fn requests(&self, cache_name: &str) -> Result<Vec<RequestKey>> {
      self.inner.requests(cache_name)
    }
    fn slot(&self, slot: WorkerSlot) -> Result<Option<String>> {
      self.inner.slot(slot)
    }
    fn set_slot(&self, slot: WorkerSlot, version: Option<&str>) -> Result<()> {
      if self.fail.load(Ordering::SeqCst) {
        return Err(color_eyre::eyre::eyre!("disk full"));
      }
      self.inner.set_slot(slot, version)
    }
  }

  #[tokio::test]
  async fn test_activate_completes_when_slots_cannot_be_saved() {
    let storage = Arc::new(BrokenSlots {
      inner: SqliteStorage::open_in_memory().unwrap(),
      fail: AtomicBool::new(false),
    });
    let network = Arc::new(MockNetwork::new());
    storage.open("v1").unwrap();
    network.respond(&url("/a.css").to_string(), StoredResponse::new(200, "B"));

    let proxy = CacheProxy::new(storage.clone(), network.clone(), config("v2", &[]));
    proxy.install().await.unwrap();
    storage.fail.store(true, Ordering::SeqCst);

    let deleted = proxy.activate().unwrap();

    assert_eq!(deleted, vec!["v1"]);
    assert_eq!(proxy.state(), WorkerState::Activated);
    let served = proxy.intercept(Request::get(url("/a.css"))).await.unwrap();
    assert_eq!(served.source, CacheSource::Network);
    assert_eq!(storage.requests("v2").unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_waiting_version_activates_in_later_run() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    assert!(CacheProxy::waiting(storage.clone(), network.clone(), config("v2", &[]))
      .unwrap()
      .is_none());

    CacheProxy::new(storage.clone(), network.clone(), config("v2", &[]))
      .install()
      .await
      .unwrap();

    let waiting = CacheProxy::waiting(storage.clone(), network.clone(), config("v2", &[]))
      .unwrap()
      .unwrap();
    assert_eq!(waiting.state(), WorkerState::Installed);
    waiting.activate().unwrap();
    assert_eq!(storage.slot(WorkerSlot::Active).unwrap().as_deref(), Some("v2"));
  }

  #[tokio::test]
  async fn test_resume_restores_active_version() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let network = Arc::new(MockNetwork::new());
    let origin = Url::parse(ORIGIN).unwrap();
    assert!(CacheProxy::resume(storage.clone(), network.clone(), origin.clone())
      .unwrap()
      .is_none());

    activated(&storage, &network, "v7").await;

    let resumed = CacheProxy::resume(storage.clone(), network.clone(), origin)
      .unwrap()
      .unwrap();
    assert_eq!(resumed.cache_name(), "v7");
    assert_eq!(resumed.state(), WorkerState::Activated);
  }
}
