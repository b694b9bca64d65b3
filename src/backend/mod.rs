//! Client for the hosted backend: email/password auth and the per-user
//! `tasks` table.

mod api_types;
mod client;
mod session;

pub use client::BackendClient;
pub use session::SessionStore;
