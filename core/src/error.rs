// pipewright/src/error.rs
use crate::model::table::TableName;
use crate::state::step::WizardStep;
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
  /// The table listing failed. Callers treat the listing as empty.
  #[error("Schema catalog unavailable. Source: {source}")]
  CatalogUnavailable {
    #[source]
    source: AnyhowError,
  },

  /// One table's columns could not be listed. Isolated to that table.
  #[error("Columns unavailable for table '{table}'. Source: {source}")]
  TableUnavailable {
    table: TableName,
    #[source]
    source: AnyhowError,
  },

  #[error("Model generation failed: {reason}")]
  GenerationFailed { reason: String },

  #[error("Columns {columns:?} are not part of table '{table}'")]
  UnknownColumns { table: TableName, columns: Vec<String> },

  #[error("No model has been generated for the current selection")]
  ModelNotReady,

  #[error("The generated model no longer matches the selection; regenerate before applying")]
  StaleModel,

  #[error("An apply for this model is already running")]
  ApplyInProgress,

  #[error("Action '{action}' is not available in step '{step}'")]
  InvalidAction { action: &'static str, step: WizardStep },

  #[error("The workflow has been closed")]
  Closed,
}

impl WizardError {
  /// Per-item and whole-operation failures the user recovers from by retrying
  /// or navigating, as opposed to misuse of the controller.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      WizardError::CatalogUnavailable { .. }
        | WizardError::TableUnavailable { .. }
        | WizardError::GenerationFailed { .. }
        | WizardError::UnknownColumns { .. }
        | WizardError::StaleModel
        | WizardError::ModelNotReady
    )
  }
}

pub type WizardResult<T, E = WizardError> = std::result::Result<T, E>;
