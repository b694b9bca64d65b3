//! On-device task store.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::types::{Task, TaskStatus};
use crate::db::{self, schema::TASK_SCHEMA};

/// Handle on the local task database.
///
/// Each handle owns its own connection; open as many isolated stores as
/// needed and close them explicitly when done.
pub struct TaskStore {
  conn: Mutex<Connection>,
}

impl TaskStore {
  /// Open the store at `<data_dir>/tasks.db`.
  pub fn open(data_dir: &Path) -> Result<Self> {
    Self::open_at(&data_dir.join("tasks.db"))
  }

  pub fn open_at(path: &Path) -> Result<Self> {
    Self::from_connection(db::open_connection(path)?)
  }

  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(db::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    db::run_migrations(&conn, TASK_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Close the underlying connection, flushing pending writes.
  pub fn close(self) -> Result<()> {
    let conn = self
      .conn
      .into_inner()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    conn
      .close()
      .map_err(|(_, e)| eyre!("Failed to close task store: {}", e))
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// All tasks in display order.
  pub fn list(&self) -> Result<Vec<Task>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT id, title, status FROM tasks ORDER BY position, id")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let rows = stmt
      .query_map([], |row| {
        Ok((
          row.get::<_, i64>(0)?,
          row.get::<_, String>(1)?,
          row.get::<_, String>(2)?,
        ))
      })
      .map_err(|e| eyre!("Failed to list tasks: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read task: {}", e))?;

    rows
      .into_iter()
      .map(|(id, title, status)| {
        Ok(Task {
          id,
          title,
          status: TaskStatus::parse(&status)?,
        })
      })
      .collect()
  }

  /// Insert a new task. Fails if the id is already taken.
  pub fn add(&self, task: &Task) -> Result<i64> {
    let conn = self.lock()?;
    let exists: bool = conn
      .query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?)",
        params![task.id],
        |row| row.get(0),
      )
      .map_err(|e| eyre!("Failed to look up task {}: {}", task.id, e))?;
    if exists {
      return Err(eyre!("Error adding task: id {} already exists", task.id));
    }

    conn
      .execute(
        "INSERT INTO tasks (id, title, status, position)
         VALUES (?, ?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM tasks))",
        params![task.id, task.title, task.status.as_str()],
      )
      .map_err(|e| eyre!("Error adding task: {}", e))?;

    Ok(task.id)
  }

  /// Insert or replace a task, keeping its position if it already exists.
  pub fn update(&self, task: &Task) -> Result<i64> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT INTO tasks (id, title, status, position)
         VALUES (?, ?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM tasks))
         ON CONFLICT(id) DO UPDATE SET title = excluded.title, status = excluded.status",
        params![task.id, task.title, task.status.as_str()],
      )
      .map_err(|e| eyre!("Error updating task: {}", e))?;

    Ok(task.id)
  }

  /// Delete a task. Deleting an unknown id is not an error.
  pub fn delete(&self, id: i64) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute("DELETE FROM tasks WHERE id = ?", params![id])
      .map_err(|e| eyre!("Error deleting task: {}", e))?;
    Ok(())
  }

  /// Persist a new order for incomplete tasks. Completed tasks follow them in
  /// their existing order; ids that are unknown or complete are skipped.
  pub fn reorder(&self, ordered_ids: &[i64]) -> Result<()> {
    let current = self.list()?;

    let mut ordered: Vec<&Task> = ordered_ids
      .iter()
      .filter_map(|id| current.iter().find(|t| t.id == *id && !t.is_complete()))
      .collect();
    // Incomplete tasks left out of the new order keep their place at the end
    ordered.extend(
      current
        .iter()
        .filter(|t| !t.is_complete() && !ordered_ids.contains(&t.id)),
    );
    ordered.extend(current.iter().filter(|t| t.is_complete()));

    let mut conn = self.lock()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;
    for (position, task) in ordered.iter().enumerate() {
      tx.execute(
        "UPDATE tasks SET position = ? WHERE id = ?",
        params![position as i64, task.id],
      )
      .map_err(|e| eyre!("Error updating task order: {}", e))?;
    }
    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }
}
