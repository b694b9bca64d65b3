//! Task model and the on-device task store.

mod repository;
mod seed;
mod store;
mod types;

pub use repository::TaskRepository;
pub use seed::load_tasks;
pub use store::TaskStore;
pub use types::{Task, TaskStatus};
