//! Handlers for the command-line subcommands.

use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::{BackendClient, SessionStore};
use crate::cache::{CacheStorage, SqliteStorage, WorkerSlot};
use crate::config::Config;
use crate::tasks::{self, Task, TaskRepository, TaskStatus, TaskStore};
use crate::worker::{CacheProxy, HttpNetwork, Network, Request};
use crate::{AuthAction, Command, TaskAction};

pub async fn run(config: &Config, data_dir: &Path, command: Command) -> Result<()> {
  match command {
    Command::Install => install(config, data_dir).await,
    Command::Activate => activate(config, data_dir),
    Command::Update => update(config, data_dir).await,
    Command::Fetch {
      path,
      method,
      headers,
      data,
      output,
    } => {
      fetch(
        config,
        data_dir,
        &path,
        &method,
        &headers,
        data,
        output.as_deref(),
      )
      .await
    }
    Command::Caches => list_caches(data_dir),
    Command::Tasks { remote, action } => run_tasks(config, data_dir, remote, action).await,
    Command::Auth { action } => run_auth(config, data_dir, action).await,
  }
}

fn open_storage(data_dir: &Path) -> Result<Arc<SqliteStorage>> {
  Ok(Arc::new(SqliteStorage::open(data_dir)?))
}

fn network() -> Arc<dyn Network> {
  Arc::new(HttpNetwork::new())
}

/// The active worker, or an uncontrolled one that forwards everything.
fn controlling_proxy(
  config: &Config,
  storage: Arc<SqliteStorage>,
) -> Result<CacheProxy<SqliteStorage>> {
  match CacheProxy::resume(Arc::clone(&storage), network(), config.origin_url()?)? {
    Some(proxy) => Ok(proxy),
    None => {
      debug!("no active worker, requests go straight to the network");
      Ok(CacheProxy::new(storage, network(), config.worker()?))
    }
  }
}

async fn install(config: &Config, data_dir: &Path) -> Result<()> {
  let storage = open_storage(data_dir)?;
  let worker = config.worker()?;
  let count = worker.precache.len();

  let proxy = CacheProxy::new(storage, network(), worker);
  proxy.install().await?;

  println!("Installed {} ({} resources cached)", proxy.cache_name(), count);
  Ok(())
}

fn activate(config: &Config, data_dir: &Path) -> Result<()> {
  let storage = open_storage(data_dir)?;
  let proxy = CacheProxy::waiting(storage, network(), config.worker()?)?.ok_or_else(|| {
    eyre!(
      "Version {} is not installed. Run `taskcache install` first.",
      config.cache_version
    )
  })?;

  let deleted = proxy.activate()?;
  println!("Activated {}", proxy.cache_name());
  for name in deleted {
    println!("  deleted cache {}", name);
  }
  Ok(())
}

async fn update(config: &Config, data_dir: &Path) -> Result<()> {
  let storage = open_storage(data_dir)?;
  if storage.slot(WorkerSlot::Active)?.as_deref() == Some(config.cache_version.as_str()) {
    println!("{} is already active", config.cache_version);
    return Ok(());
  }

  install(config, data_dir).await?;
  activate(config, data_dir)
}

async fn fetch(
  config: &Config,
  data_dir: &Path,
  path: &str,
  method: &str,
  headers: &[String],
  data: Option<String>,
  output: Option<&Path>,
) -> Result<()> {
  let proxy = controlling_proxy(config, open_storage(data_dir)?)?;

  let method = Method::from_bytes(method.to_uppercase().as_bytes())
    .map_err(|_| eyre!("Invalid HTTP method '{}'", method))?;
  let mut request = Request::new(method, proxy.resolve(path)?);
  for header in headers {
    let (name, value) = parse_header(header)?;
    request = request.with_header(name, value);
  }
  if let Some(data) = data {
    request = request.with_body(data);
  }

  let intercepted = proxy.intercept(request).await?;
  eprintln!(
    "{} ({:?}, {}, {} bytes)",
    intercepted.response.status,
    intercepted.source,
    intercepted
      .response
      .header("content-type")
      .unwrap_or("unknown type"),
    intercepted.response.body.len()
  );

  match output {
    Some(path) => std::fs::write(path, &intercepted.response.body)
      .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?,
    None => std::io::stdout()
      .write_all(&intercepted.response.body)
      .map_err(|e| eyre!("Failed to write response: {}", e))?,
  }

  // Stay alive until the background refresh has updated the cache
  if let Some(revalidation) = intercepted.revalidation {
    match revalidation.wait().await {
      Ok(fresh) => info!(path, status = fresh.status, "cache refreshed"),
      Err(e) => debug!(path, error = %e, "cache refresh failed"),
    }
  }
  Ok(())
}

/// Split a curl-style "Name: value" header argument.
fn parse_header(raw: &str) -> Result<(&str, &str)> {
  let (name, value) = raw
    .split_once(':')
    .ok_or_else(|| eyre!("Invalid header '{}', expected \"Name: value\"", raw))?;
  let name = name.trim();
  if name.is_empty() {
    return Err(eyre!("Invalid header '{}', the name is empty", raw));
  }
  Ok((name, value.trim()))
}

fn list_caches(data_dir: &Path) -> Result<()> {
  let storage = open_storage(data_dir)?;
  let active = storage.slot(WorkerSlot::Active)?;
  let waiting = storage.slot(WorkerSlot::Waiting)?;

  let names = storage.keys()?;
  if names.is_empty() {
    println!("No caches.");
  }
  for name in names {
    let marker = if active.as_deref() == Some(name.as_str()) {
      " (active)"
    } else if waiting.as_deref() == Some(name.as_str()) {
      " (waiting)"
    } else {
      ""
    };
    println!("{}{}", name, marker);
    for key in storage.requests(&name)? {
      println!("  {}", key);
    }
  }
  Ok(())
}

fn backend_client(config: &Config, data_dir: &Path) -> Result<BackendClient> {
  Ok(BackendClient::new(
    config.backend_url()?,
    Config::get_backend_key()?,
    SessionStore::new(data_dir),
  ))
}

async fn run_tasks(config: &Config, data_dir: &Path, remote: bool, action: TaskAction) -> Result<()> {
  if remote {
    let client = backend_client(config, data_dir)?;
    return apply(&client, action).await;
  }

  let store = TaskStore::open(data_dir)?;
  let result = match action {
    TaskAction::List => {
      let proxy = controlling_proxy(config, open_storage(data_dir)?)?;
      tasks::load_tasks(&store, &proxy)
        .await
        .map(|tasks| print_tasks(&tasks))
    }
    TaskAction::Reorder { ids } => store.reorder(&ids),
    other => apply(&store, other).await,
  };
  store.close()?;
  result
}

async fn apply(repo: &dyn TaskRepository, action: TaskAction) -> Result<()> {
  match action {
    TaskAction::List => print_tasks(&repo.list().await?),
    TaskAction::Add { title } => {
      let task = Task::new(&title)?;
      repo.add(&task).await?;
      println!("Added {}: {}", task.id, task.title);
    }
    TaskAction::Done { id } => set_status(repo, id, TaskStatus::Complete).await?,
    TaskAction::Undo { id } => set_status(repo, id, TaskStatus::Incomplete).await?,
    TaskAction::Edit { id, title } => {
      let title = title.trim();
      if title.is_empty() {
        return Err(eyre!("Task title cannot be empty!"));
      }
      let mut task = find(repo, id).await?;
      task.title = title.to_string();
      repo.update(&task).await?;
    }
    TaskAction::Delete { id } => repo.delete(id).await?,
    TaskAction::Reorder { .. } => {
      return Err(eyre!("Reordering is only supported by the local task store"))
    }
  }
  Ok(())
}

async fn find(repo: &dyn TaskRepository, id: i64) -> Result<Task> {
  repo
    .list()
    .await?
    .into_iter()
    .find(|t| t.id == id)
    .ok_or_else(|| eyre!("No task with id {}", id))
}

async fn set_status(repo: &dyn TaskRepository, id: i64, status: TaskStatus) -> Result<()> {
  let mut task = find(repo, id).await?;
  task.status = status;
  repo.update(&task).await?;
  Ok(())
}

fn print_tasks(tasks: &[Task]) {
  let (done, active): (Vec<&Task>, Vec<&Task>) = tasks.iter().partition(|t| t.is_complete());

  println!("Tasks");
  if active.is_empty() {
    println!("  No active tasks. Add one!");
  }
  for task in active {
    println!("  [ ] {} {}", task.id, task.title);
  }

  println!("Completed");
  if done.is_empty() {
    println!("  No completed tasks yet.");
  }
  for task in done {
    println!("  [x] {} {}", task.id, task.title);
  }
}

async fn run_auth(config: &Config, data_dir: &Path, action: AuthAction) -> Result<()> {
  let client = backend_client(config, data_dir)?;
  match action {
    AuthAction::Signup { email, password } => {
      client.sign_up(&email, &password).await?;
      println!("Signup successful! Please check your email to verify your account.");
    }
    AuthAction::Signin { email, password } => {
      let session = client.sign_in(&email, &password).await?;
      println!(
        "Signed in as {}",
        session.user.email.as_deref().unwrap_or(&session.user.id)
      );
    }
    AuthAction::Signout => {
      client.sign_out().await?;
      println!("Signed out");
    }
    AuthAction::Session => match client.current_session()? {
      Some(session) => println!(
        "{} (expires {})",
        session.user.email.as_deref().unwrap_or(&session.user.id),
        session.expires_at
      ),
      None => println!("Not signed in"),
    },
  }
  Ok(())
}
