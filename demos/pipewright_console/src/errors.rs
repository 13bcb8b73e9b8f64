// demos/pipewright_console/src/errors.rs

use pipewright::WizardError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from] // Allows conversion from pipewright::WizardError
    source: WizardError,
  },

  #[error("HTTP Error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Internal Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<reqwest::Error>() {
      Ok(http) => AppError::Http(http),
      Err(other) => AppError::Internal(format!("{other:#}")),
    }
  }
}

impl AppError {
  /// Process exit code for this failure.
  pub fn exit_code(&self) -> i32 {
    match self {
      AppError::Config(_) => 2,
      AppError::Workflow { .. } => 3,
      AppError::Http(_) => 4,
      AppError::Internal(_) => 1,
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
