use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Send tracing output to `<data_dir>/taskcache.log`.
///
/// Stdout is reserved for command output. The returned guard flushes the
/// writer when dropped, so keep it alive for the whole run.
pub fn init(data_dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(data_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", data_dir.display(), e))?;

  let appender = tracing_appender::rolling::never(data_dir, "taskcache.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  // Use RUST_LOG environment variable, default to info level
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
