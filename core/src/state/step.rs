// pipewright/src/state/step.rs

//! Wizard steps and the transient state scoped to each of them.

use crate::model::artifact::ApplyOutcome;
use crate::model::table::TableName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
  TableSelection,
  ColumnSelection,
  ModelPreview,
}

impl WizardStep {
  pub fn next(self) -> Option<WizardStep> {
    match self {
      WizardStep::TableSelection => Some(WizardStep::ColumnSelection),
      WizardStep::ColumnSelection => Some(WizardStep::ModelPreview),
      WizardStep::ModelPreview => None,
    }
  }

  pub fn previous(self) -> Option<WizardStep> {
    match self {
      WizardStep::TableSelection => None,
      WizardStep::ColumnSelection => Some(WizardStep::TableSelection),
      WizardStep::ModelPreview => Some(WizardStep::ColumnSelection),
    }
  }
}

impl fmt::Display for WizardStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      WizardStep::TableSelection => "table_selection",
      WizardStep::ColumnSelection => "column_selection",
      WizardStep::ModelPreview => "model_preview",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum GenerationStatus {
  Generating,
  Ready,
  Failed(String),
  /// No model matches the selection, which changed after the last generation
  /// was issued. Cleared by regenerating.
  Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "outcome", rename_all = "snake_case")]
pub enum ApplyStatus {
  Idle,
  Applying,
  Finished(ApplyOutcome),
}

/// The current step together with its transient flags.
///
/// Leaving a step replaces the whole value, so loading and error flags never
/// outlive the step that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepState {
  TableSelection {
    listing: bool,
    error: Option<String>,
  },
  ColumnSelection {
    expanded: BTreeSet<TableName>,
  },
  ModelPreview {
    generation: GenerationStatus,
    apply: ApplyStatus,
  },
}

impl StepState {
  pub fn entering(step: WizardStep) -> Self {
    match step {
      WizardStep::TableSelection => StepState::TableSelection {
        listing: false,
        error: None,
      },
      WizardStep::ColumnSelection => StepState::ColumnSelection {
        expanded: BTreeSet::new(),
      },
      WizardStep::ModelPreview => StepState::ModelPreview {
        generation: GenerationStatus::Generating,
        apply: ApplyStatus::Idle,
      },
    }
  }

  pub fn step(&self) -> WizardStep {
    match self {
      StepState::TableSelection { .. } => WizardStep::TableSelection,
      StepState::ColumnSelection { .. } => WizardStep::ColumnSelection,
      StepState::ModelPreview { .. } => WizardStep::ModelPreview,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      StepState::TableSelection { error, .. } => error.as_deref(),
      StepState::ModelPreview {
        generation: GenerationStatus::Failed(reason),
        ..
      } => Some(reason),
      _ => None,
    }
  }
}

impl Default for StepState {
  fn default() -> Self {
    StepState::entering(WizardStep::TableSelection)
  }
}
