use color_eyre::{eyre::eyre, Result};
use tracing::{debug, info};

use super::store::TaskStore;
use super::types::{SeedFile, Task};
use crate::cache::CacheStorage;
use crate::worker::{CacheProxy, Request};

/// Path of the seed document, relative to the origin.
pub const SEED_PATH: &str = "data.json";

/// List local tasks, seeding an empty store from `data.json` first.
///
/// The seed document is requested through the proxy like any page request,
/// so it is served from cache when offline.
pub async fn load_tasks<S: CacheStorage + 'static>(
  store: &TaskStore,
  proxy: &CacheProxy<S>,
) -> Result<Vec<Task>> {
  let tasks = store.list()?;
  if !tasks.is_empty() {
    return Ok(tasks);
  }

  let url = proxy.resolve(SEED_PATH)?;
  let intercepted = proxy.intercept(Request::get(url)).await?;

  if !intercepted.response.is_success() {
    return Err(eyre!(
      "Error loading data: {} returned status {}",
      SEED_PATH,
      intercepted.response.status
    ));
  }

  let seed: SeedFile = serde_json::from_slice(&intercepted.response.body)
    .map_err(|e| eyre!("Error loading data: {}", e))?;
  for task in &seed.tasks {
    store.add(task)?;
  }
  info!(count = seed.tasks.len(), "seeded local task store");

  if let Some(revalidation) = intercepted.revalidation {
    if let Err(e) = revalidation.wait().await {
      debug!(error = %e, "seed refresh failed");
    }
  }

  store.list()
}
