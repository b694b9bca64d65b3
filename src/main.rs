mod backend;
mod cache;
mod commands;
mod config;
mod db;
mod logging;
mod tasks;
mod worker;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskcache")]
#[command(about = "Offline-capable task list with a stale-while-revalidate cache proxy")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/taskcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Install the configured worker version by precaching its manifest
  Install,
  /// Activate the installed version and delete every other cache
  Activate,
  /// Install and activate in one step
  Update,
  /// Request a path through the active worker
  Fetch {
    /// Path relative to the origin
    path: String,
    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,
    /// Extra request header, as "Name: value"
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,
    /// Request body
    #[arg(short, long)]
    data: Option<String>,
    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// List named caches and their entries
  Caches,
  /// Manage tasks
  Tasks {
    /// Use the hosted backend instead of the local store
    #[arg(long)]
    remote: bool,
    #[command(subcommand)]
    action: TaskAction,
  },
  /// Sign in to or out of the hosted backend
  Auth {
    #[command(subcommand)]
    action: AuthAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
  List,
  Add { title: String },
  /// Mark a task as complete
  Done { id: i64 },
  /// Mark a task as incomplete again
  Undo { id: i64 },
  Edit { id: i64, title: String },
  Delete { id: i64 },
  /// Set the order of incomplete tasks
  Reorder { ids: Vec<i64> },
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
  Signup {
    email: String,
    #[arg(long, env = "TASKCACHE_PASSWORD", hide_env_values = true)]
    password: String,
  },
  Signin {
    email: String,
    #[arg(long, env = "TASKCACHE_PASSWORD", hide_env_values = true)]
    password: String,
  },
  Signout,
  /// Show the current session
  Session,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let data_dir = config.data_dir()?;
  let _log_guard = logging::init(&data_dir)?;

  commands::run(&config, &data_dir, args.command).await
}
