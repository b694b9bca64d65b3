//! The offline cache proxy: install, activate and request interception for
//! one deployed worker version.

mod lifecycle;
#[cfg(test)]
pub(crate) mod mock;
mod network;
mod proxy;

pub use network::{HttpNetwork, Network, Request};
pub use proxy::{CacheProxy, WorkerConfig};
