// pipewright/src/model/artifact.rs

//! Outputs of the preview step: the generated model and the apply outcome.

use crate::model::selection::{DerivationKey, Selection, TableColumns};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated warehouse model, tied to the selection it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedModel {
  pub text: String,
  pub key: DerivationKey,
  pub mapping: TableColumns,
  pub generated_at: DateTime<Utc>,
}

impl GeneratedModel {
  pub fn new(text: impl Into<String>, selection: &Selection) -> Self {
    Self {
      text: text.into(),
      key: selection.derivation_key(),
      mapping: selection.mapping(),
      generated_at: Utc::now(),
    }
  }

  /// `false` once the selection has changed since generation.
  pub fn is_current_for(&self, selection: &Selection) -> bool {
    self.key == selection.derivation_key()
  }
}

/// Response body of an apply backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResponse {
  pub success: bool,
  #[serde(default)]
  pub detail: Option<String>,
}

impl ApplyResponse {
  pub fn ok() -> Self {
    Self {
      success: true,
      detail: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ApplyOutcome {
  Success,
  PartialFailure(String),
  Failure(String),
}

impl ApplyOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, ApplyOutcome::Success)
  }
}

impl From<ApplyResponse> for ApplyOutcome {
  fn from(resp: ApplyResponse) -> Self {
    match (resp.success, resp.detail) {
      (true, None) => ApplyOutcome::Success,
      (true, Some(detail)) => ApplyOutcome::PartialFailure(detail),
      (false, detail) => ApplyOutcome::Failure(detail.unwrap_or_else(|| "apply rejected".to_string())),
    }
  }
}
