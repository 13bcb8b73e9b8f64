// pipewright/src/wizard/view.rs

use crate::model::artifact::{ApplyOutcome, GeneratedModel};
use crate::model::selection::Selection;
use crate::model::snapshot::CatalogSnapshot;
use crate::model::table::TableName;
use crate::state::step::{ApplyStatus, GenerationStatus, StepState, WizardStep};
use crate::wizard::controller::WizardData;
use serde::Serialize;
use uuid::Uuid;

/// Point-in-time, read-only copy of a workflow for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
  pub workflow_id: Uuid,
  pub step: WizardStep,
  pub state: StepState,
  pub available_tables: Vec<TableName>,
  pub selection: Selection,
  pub snapshot: CatalogSnapshot,
  /// Last generated model, current or not; see `model_is_current`.
  pub model: Option<GeneratedModel>,
  pub model_is_current: bool,
  pub last_apply: Option<ApplyOutcome>,
  pub can_advance: bool,
  /// Whether the current step is waiting on a backend.
  pub loading: bool,
  /// Step-scoped error to display, if any.
  pub error: Option<String>,
  pub closed: bool,
}

impl WizardView {
  pub(crate) fn project(workflow_id: Uuid, data: &WizardData) -> Self {
    let loading = match &data.state {
      StepState::TableSelection { listing, .. } => *listing,
      StepState::ColumnSelection { .. } => data
        .store
        .selection()
        .tables()
        .iter()
        .any(|t| data.snapshot.get(t).map_or(true, |r| !r.is_settled())),
      StepState::ModelPreview { generation, apply } => {
        *generation == GenerationStatus::Generating || *apply == ApplyStatus::Applying
      }
    };
    Self {
      workflow_id,
      step: data.step(),
      state: data.state.clone(),
      available_tables: data.available_tables.clone(),
      selection: data.store.selection().clone(),
      snapshot: data.snapshot.clone(),
      model: data.model.clone(),
      model_is_current: data.model_is_current(),
      last_apply: data.last_apply.clone(),
      can_advance: !data.closed && data.can_advance(),
      loading,
      error: data.state.error().map(str::to_string),
      closed: data.closed,
    }
  }

  /// Columns to render for `table`; empty while pending or after a failure.
  pub fn columns_for(&self, table: &TableName) -> Vec<&str> {
    self
      .snapshot
      .columns_for(table)
      .iter()
      .map(|c| c.name.as_str())
      .collect()
  }
}

/// What a finished workflow hands back to its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedWorkflow {
  pub workflow_id: Uuid,
  pub selection: Selection,
  /// The model generated for `selection`, if one exists.
  pub model: Option<GeneratedModel>,
  pub apply_outcome: Option<ApplyOutcome>,
}
