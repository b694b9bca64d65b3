use async_trait::async_trait;
use color_eyre::Result;

use super::store::TaskStore;
use super::types::Task;

/// Task persistence, backed either by the local store or the hosted backend.
#[async_trait]
pub trait TaskRepository: Send + Sync {
  async fn list(&self) -> Result<Vec<Task>>;

  async fn add(&self, task: &Task) -> Result<i64>;

  async fn update(&self, task: &Task) -> Result<i64>;

  async fn delete(&self, id: i64) -> Result<()>;
}

#[async_trait]
impl TaskRepository for TaskStore {
  async fn list(&self) -> Result<Vec<Task>> {
    TaskStore::list(self)
  }

  async fn add(&self, task: &Task) -> Result<i64> {
    TaskStore::add(self, task)
  }

  async fn update(&self, task: &Task) -> Result<i64> {
    TaskStore::update(self, task)
  }

  async fn delete(&self, id: i64) -> Result<()> {
    TaskStore::delete(self, id)
  }
}
