use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};

/// Completion state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  #[default]
  Incomplete,
  Complete,
}

impl TaskStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskStatus::Incomplete => "incomplete",
      TaskStatus::Complete => "complete",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "incomplete" => Ok(TaskStatus::Incomplete),
      "complete" => Ok(TaskStatus::Complete),
      other => Err(eyre!("Unknown task status '{}'", other)),
    }
  }
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub status: TaskStatus,
}

impl Task {
  /// Create an incomplete task with a timestamp id.
  pub fn new(title: &str) -> Result<Self> {
    let title = title.trim();
    if title.is_empty() {
      return Err(eyre!("Task title cannot be empty!"));
    }

    Ok(Self {
      id: Utc::now().timestamp_millis(),
      title: title.to_string(),
      status: TaskStatus::Incomplete,
    })
  }

  pub fn is_complete(&self) -> bool {
    self.status == TaskStatus::Complete
  }
}

/// Seed document served as `data.json`
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
  #[serde(default)]
  pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_blank_title_rejected() {
    assert!(Task::new("   ").is_err());
    let task = Task::new("  Buy milk ").unwrap();
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.status, TaskStatus::Incomplete);
  }

  #[test]
  fn test_status_wire_format() {
    let task: Task =
      serde_json::from_str(r#"{"id": 1, "title": "a", "status": "complete"}"#).unwrap();
    assert!(task.is_complete());
    assert_eq!(
      serde_json::to_value(&task).unwrap()["status"],
      serde_json::json!("complete")
    );
  }

  #[test]
  fn test_seed_file_without_tasks() {
    let seed: SeedFile = serde_json::from_str("{}").unwrap();
    assert!(seed.tasks.is_empty());
  }
}
