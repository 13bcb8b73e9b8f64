// demos/pipewright_console/src/services/mod.rs

pub mod http_backend;
pub mod mock_backend;

use crate::config::{AppConfig, BackendKind};
use crate::errors::{AppError, Result as AppResult};
use pipewright::WizardServices;
use std::sync::Arc;

/// Builds the collaborators selected by `PIPEWRIGHT_BACKEND`.
pub fn build_services(config: &AppConfig) -> AppResult<WizardServices> {
  match config.backend {
    BackendKind::Mock => {
      tracing::info!(latency_ms = config.mock_latency.as_millis() as u64, "Using the mock backend.");
      Ok(WizardServices::from_backend(Arc::new(mock_backend::MockBackend::new(
        config.mock_latency,
      ))))
    }
    BackendKind::Http => {
      let api_url = config
        .api_url
        .as_deref()
        .ok_or_else(|| AppError::Config("PIPEWRIGHT_API_URL is not set".to_string()))?;
      tracing::info!(%api_url, "Using the HTTP backend.");
      let backend = http_backend::HttpBackend::new(api_url, config.http_timeout, config.db.clone())?;
      Ok(WizardServices::from_backend(Arc::new(backend)))
    }
  }
}
