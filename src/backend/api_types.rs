//! Wire types of the hosted backend's auth and REST endpoints.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::session::{Session, User};
use crate::tasks::{Task, TaskStatus};

#[derive(Debug, Serialize)]
pub struct ApiCredentials<'a> {
  pub email: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  pub id: String,
  pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTokenResponse {
  pub access_token: String,
  pub refresh_token: String,
  /// Lifetime in seconds
  pub expires_in: i64,
  pub user: ApiUser,
}

impl ApiTokenResponse {
  pub fn into_session(self) -> Session {
    Session {
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      expires_at: Utc::now() + Duration::seconds(self.expires_in),
      user: User {
        id: self.user.id,
        email: self.user.email,
      },
    }
  }
}

/// Error body; auth and REST endpoints use different field names.
#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
  pub error_description: Option<String>,
  pub msg: Option<String>,
  pub message: Option<String>,
}

impl ApiError {
  pub fn message(&self) -> Option<&str> {
    self
      .error_description
      .as_deref()
      .or(self.msg.as_deref())
      .or(self.message.as_deref())
  }
}

/// A row of the remote `tasks` table.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiTask {
  pub id: i64,
  pub title: String,
  pub status: TaskStatus,
  pub user_id: String,
}

impl ApiTask {
  pub fn from_task(task: &Task, user_id: &str) -> Self {
    Self {
      id: task.id,
      title: task.title.clone(),
      status: task.status,
      user_id: user_id.to_string(),
    }
  }
}

impl From<ApiTask> for Task {
  fn from(row: ApiTask) -> Self {
    Task {
      id: row.id,
      title: row.title,
      status: row.status,
    }
  }
}
