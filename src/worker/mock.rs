//! Scripted network for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

use super::network::{Network, NetworkError, Request};
use crate::cache::StoredResponse;

/// In-process network with per-URL responses, an offline switch and an
/// optional gate that holds every fetch until released.
#[derive(Default)]
pub struct MockNetwork {
  responses: Mutex<HashMap<String, StoredResponse>>,
  offline: AtomicBool,
  gate: Option<Semaphore>,
  calls: Mutex<Vec<String>>,
}

impl MockNetwork {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every fetch waits for a `release` before answering.
  pub fn gated() -> Self {
    Self {
      gate: Some(Semaphore::new(0)),
      ..Self::default()
    }
  }

  pub fn respond(&self, url: &str, response: StoredResponse) {
    self
      .responses
      .lock()
      .unwrap()
      .insert(url.to_string(), response);
  }

  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  /// Let `n` held fetches proceed.
  pub fn release(&self, n: usize) {
    if let Some(gate) = &self.gate {
      gate.add_permits(n);
    }
  }

  /// "METHOD url" for every fetch that reached the network.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl Network for MockNetwork {
  async fn fetch(&self, request: &Request) -> Result<StoredResponse, NetworkError> {
    self
      .calls
      .lock()
      .unwrap()
      .push(format!("{} {}", request.method, request.url));

    if let Some(gate) = &self.gate {
      if let Ok(permit) = gate.acquire().await {
        permit.forget();
      }
    }

    if self.offline.load(Ordering::SeqCst) {
      return Err(NetworkError::Transport {
        url: request.url.to_string(),
        reason: "offline".to_string(),
      });
    }

    let response = self
      .responses
      .lock()
      .unwrap()
      .get(request.url.as_str())
      .cloned()
      .unwrap_or_else(|| StoredResponse::new(404, "not found"));
    Ok(response)
  }
}
