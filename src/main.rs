mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod event;
mod notify;
mod task;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "p9s")]
#[command(about = "A terminal UI for a product catalog REST API, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/p9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the product API (overrides config and P9S_API_URL)
  #[arg(long)]
  api_url: Option<String>,

  /// Products per page
  #[arg(long)]
  page_size: Option<u64>,

  /// Log filter, e.g. "debug" or "p9s=trace"
  #[arg(long, env = "P9S_LOG", default_value = "info")]
  log: String,
}

/// Log to a daily file: the terminal belongs to the UI.
fn init_logging(filter: &str) -> Option<WorkerGuard> {
  let dir = dirs::data_local_dir()?.join("p9s");
  std::fs::create_dir_all(&dir).ok()?;

  let appender = tracing_appender::rolling::daily(dir, "p9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_ansi(false)
    .with_writer(writer)
    .init();

  Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_logging(&args.log);

  // Load configuration: file, then environment, then flags
  let mut config = config::Config::load(args.config.as_deref())?.with_env();
  if let Some(url) = args.api_url {
    config.api.url = url;
  }
  if let Some(page_size) = args.page_size {
    config.pagination.page_size = page_size;
  }
  config.validate()?;

  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
