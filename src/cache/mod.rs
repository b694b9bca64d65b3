//! Named, versioned response caches.
//!
//! A named cache maps a request identity (method + URL) to a stored response.
//! Each deployed worker version owns exactly one named cache; older ones are
//! removed when a newer version activates.

mod storage;
mod traits;

pub use storage::SqliteStorage;
pub use traits::{CacheSource, CacheStorage, RequestKey, StoredResponse, WorkerSlot};
#[cfg(test)]
pub use traits::CachedResponse;
