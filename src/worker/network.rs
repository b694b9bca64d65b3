//! Network seam for the cache proxy.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::cache::{RequestKey, StoredResponse};

/// Errors raised when a request cannot reach the network.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
  #[error("network request to {url} failed: {reason}")]
  Transport { url: String, reason: String },

  #[error("invalid request URL {0}")]
  InvalidUrl(String),

  #[error("background fetch aborted: {0}")]
  Aborted(String),
}

/// An outgoing page request.
#[derive(Debug, Clone)]
pub struct Request {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub body: Option<Vec<u8>>,
}

impl Request {
  pub fn new(method: Method, url: Url) -> Self {
    Self {
      method,
      url,
      headers: Vec::new(),
      body: None,
    }
  }

  pub fn get(url: Url) -> Self {
    Self::new(Method::GET, url)
  }

  pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
    self.body = Some(body.into());
    self
  }

  /// Cache identity of this request.
  pub fn key(&self) -> RequestKey {
    RequestKey::new(self.method.as_str(), self.url.as_str())
  }
}

/// Something that can perform a request against the network.
#[async_trait]
pub trait Network: Send + Sync {
  async fn fetch(&self, request: &Request) -> Result<StoredResponse, NetworkError>;
}

/// Network implementation over reqwest.
#[derive(Clone)]
pub struct HttpNetwork {
  client: reqwest::Client,
}

impl HttpNetwork {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
    }
  }
}

impl Default for HttpNetwork {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Network for HttpNetwork {
  async fn fetch(&self, request: &Request) -> Result<StoredResponse, NetworkError> {
    let transport = |e: reqwest::Error| NetworkError::Transport {
      url: request.url.to_string(),
      reason: e.to_string(),
    };

    let mut builder = self
      .client
      .request(request.method.clone(), request.url.clone());
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
      builder = builder.body(body.clone());
    }

    let response = builder.send().await.map_err(transport)?;

    let status = response.status().as_u16();
    let headers = raw_headers(response.headers());
    let body = response.bytes().await.map_err(transport)?.to_vec();

    Ok(StoredResponse {
      status,
      headers,
      body,
    })
  }
}

/// Response headers in arrival order, values kept byte for byte.
fn raw_headers(headers: &HeaderMap) -> Vec<(String, Vec<u8>)> {
  headers
    .iter()
    .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
    .collect()
}
