// demos/pipewright_console/src/main.rs

mod config;
mod errors;
mod script;
mod services;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  init_tracing(config::log_json_enabled());

  if let Err(e) = run().await {
    tracing::error!(error = %e, "Pipeline definition failed.");
    eprintln!("error: {}", e);
    std::process::exit(e.exit_code());
  }
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .with_writer(std::io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn run() -> AppResult<()> {
  let app_config = AppConfig::from_env()?;
  tracing::info!("Starting pipeline definition console...");

  let services = services::build_services(&app_config)?;
  let completed = script::run(&app_config, services).await?;

  let summary = serde_json::to_string_pretty(&completed).map_err(anyhow::Error::from)?;
  println!("\n{}", summary);
  Ok(())
}
