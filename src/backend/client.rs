use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{RequestBuilder, Response};
use tracing::{info, warn};
use url::Url;

use super::api_types::{ApiCredentials, ApiError, ApiTask, ApiTokenResponse};
use super::session::{Session, SessionStore};
use crate::tasks::{Task, TaskRepository};

/// Client for the hosted auth service and its `tasks` table.
#[derive(Clone)]
pub struct BackendClient {
  client: reqwest::Client,
  base: Url,
  api_key: String,
  sessions: SessionStore,
}

/// Reject blank credentials before contacting the backend.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
  if email.trim().is_empty() || password.is_empty() {
    return Err(eyre!("Please provide both email and password."));
  }
  Ok(())
}

impl BackendClient {
  pub fn new(base: Url, api_key: String, sessions: SessionStore) -> Self {
    Self {
      client: reqwest::Client::new(),
      base,
      api_key,
      sessions,
    }
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid backend endpoint {}: {}", path, e))
  }

  /// URL of the `tasks` table filtered to one user, optionally to one task.
  fn tasks_url(&self, user_id: &str, task_id: Option<i64>) -> Result<Url> {
    let mut url = self.endpoint("rest/v1/tasks")?;
    {
      let mut query = url.query_pairs_mut();
      if let Some(id) = task_id {
        query.append_pair("id", &format!("eq.{}", id));
      }
      query.append_pair("user_id", &format!("eq.{}", user_id));
    }
    Ok(url)
  }

  fn authorized(&self, builder: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
    let token = session.map_or(self.api_key.as_str(), |s| s.access_token.as_str());
    builder.header("apikey", &self.api_key).bearer_auth(token)
  }

  /// Turn a non-success response into an error carrying the backend's message.
  async fn check(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
      return Ok(response);
    }

    let status = response.status();
    let body: ApiError = response.json().await.unwrap_or_default();
    let message = body
      .message()
      .map(String::from)
      .unwrap_or_else(|| status.to_string());
    Err(eyre!("{} failed: {}", action, message))
  }

  pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
    validate_credentials(email, password)?;

    let response = self
      .authorized(self.client.post(self.endpoint("auth/v1/signup")?), None)
      .json(&ApiCredentials { email, password })
      .send()
      .await
      .map_err(|e| eyre!("Signup failed: {}", e))?;
    Self::check(response, "Signup").await?;

    info!(email, "signed up");
    Ok(())
  }

  pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
    validate_credentials(email, password)?;

    let mut url = self.endpoint("auth/v1/token")?;
    url.query_pairs_mut().append_pair("grant_type", "password");

    let response = self
      .authorized(self.client.post(url), None)
      .json(&ApiCredentials { email, password })
      .send()
      .await
      .map_err(|e| eyre!("Login failed: {}", e))?;
    let token: ApiTokenResponse = Self::check(response, "Login")
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Login failed: unexpected response: {}", e))?;

    let session = token.into_session();
    self.sessions.save(&session)?;
    info!(user = %session.user.id, "signed in");
    Ok(session)
  }

  /// Revoke the session remotely when possible; the local copy is always dropped.
  pub async fn sign_out(&self) -> Result<()> {
    if let Some(session) = self.sessions.load()? {
      let result = match self.endpoint("auth/v1/logout") {
        Ok(url) => self
          .authorized(self.client.post(url), Some(&session))
          .send()
          .await
          .map_err(|e| eyre!("Logout failed: {}", e)),
        Err(e) => Err(e),
      };
      match result {
        Ok(response) => {
          if let Err(e) = Self::check(response, "Logout").await {
            warn!(error = %e, "remote sign out rejected");
          }
        }
        Err(e) => warn!(error = %e, "remote sign out failed"),
      }
    }

    self.sessions.clear()
  }

  pub fn current_session(&self) -> Result<Option<Session>> {
    self.sessions.load()
  }

  fn require_session(&self) -> Result<Session> {
    self
      .current_session()?
      .ok_or_else(|| eyre!("Not signed in. Run `taskcache auth signin` first."))
  }

  pub async fn select_tasks(&self) -> Result<Vec<Task>> {
    let session = self.require_session()?;
    let mut url = self.tasks_url(&session.user.id, None)?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("order", "id.asc");

    let response = self
      .authorized(self.client.get(url), Some(&session))
      .send()
      .await
      .map_err(|e| eyre!("Error getting tasks: {}", e))?;
    let rows: Vec<ApiTask> = Self::check(response, "Getting tasks")
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Error getting tasks: {}", e))?;

    Ok(rows.into_iter().map(Task::from).collect())
  }

  pub async fn insert_task(&self, task: &Task) -> Result<i64> {
    let session = self.require_session()?;
    let response = self
      .authorized(self.client.post(self.endpoint("rest/v1/tasks")?), Some(&session))
      .header("Prefer", "return=minimal")
      .json(&ApiTask::from_task(task, &session.user.id))
      .send()
      .await
      .map_err(|e| eyre!("Error adding task: {}", e))?;
    Self::check(response, "Adding task").await?;
    Ok(task.id)
  }

  pub async fn update_task(&self, task: &Task) -> Result<i64> {
    let session = self.require_session()?;
    let url = self.tasks_url(&session.user.id, Some(task.id))?;
    let response = self
      .authorized(self.client.patch(url), Some(&session))
      .header("Prefer", "return=minimal")
      .json(&ApiTask::from_task(task, &session.user.id))
      .send()
      .await
      .map_err(|e| eyre!("Error updating task: {}", e))?;
    Self::check(response, "Updating task").await?;
    Ok(task.id)
  }

  pub async fn delete_task(&self, id: i64) -> Result<()> {
    let session = self.require_session()?;
    let url = self.tasks_url(&session.user.id, Some(id))?;
    let response = self
      .authorized(self.client.delete(url), Some(&session))
      .send()
      .await
      .map_err(|e| eyre!("Error deleting task: {}", e))?;
    Self::check(response, "Deleting task").await?;
    Ok(())
  }
}

#[async_trait]
impl TaskRepository for BackendClient {
  async fn list(&self) -> Result<Vec<Task>> {
    self.select_tasks().await
  }

  async fn add(&self, task: &Task) -> Result<i64> {
    self.insert_task(task).await
  }

  async fn update(&self, task: &Task) -> Result<i64> {
    self.update_task(task).await
  }

  async fn delete(&self, id: i64) -> Result<()> {
    self.delete_task(id).await
  }
}
