// pipewright/src/wizard/controller.rs

//! The `WizardController`: owner of one pipeline-definition workflow.
//!
//! The controller is a small state machine over
//! `TableSelection -> ColumnSelection -> ModelPreview`. It owns the selection,
//! the catalog snapshot and the generated model, and is the only thing that
//! mutates them.
//!
//! Actions that reach a backend (`start`, `advance`, `retry_table`,
//! `regenerate`, `apply`) are `async` and resolve once their side effect has
//! settled. Clones of a controller share the workflow, so a host can keep
//! reading [`WizardController::view`] or navigate while an action is pending.
//! Every async completion is checked against the state at the moment it
//! arrives and is dropped if the workflow has moved on.

use crate::error::{WizardError, WizardResult};
use crate::fetch::ColumnFetchCoordinator;
use crate::model::artifact::{ApplyOutcome, GeneratedModel};
use crate::model::selection::{DerivationKey, Selection, SelectionStore};
use crate::model::snapshot::CatalogSnapshot;
use crate::model::table::TableName;
use crate::services::{ModelApplyService, ModelGenerationService, SchemaCatalogClient, WizardServices};
use crate::state::cell::StateCell;
use crate::state::step::{ApplyStatus, GenerationStatus, StepState, WizardStep};
use crate::wizard::view::{CompletedWorkflow, WizardView};
use std::collections::{BTreeSet, HashSet};
use tracing::{event, instrument, Level};
use uuid::Uuid;

/// Everything a workflow holds between user actions.
#[derive(Debug, Default)]
pub(crate) struct WizardData {
  pub(crate) state: StepState,
  pub(crate) store: SelectionStore,
  pub(crate) available_tables: Vec<TableName>,
  pub(crate) snapshot: CatalogSnapshot,
  pub(crate) listing_tables: bool,
  pub(crate) columns_in_flight: BTreeSet<TableName>,
  pub(crate) model: Option<GeneratedModel>,
  pub(crate) generating: HashSet<DerivationKey>,
  pub(crate) applying: bool,
  pub(crate) last_apply: Option<ApplyOutcome>,
  pub(crate) closed: bool,
}

impl WizardData {
  pub(crate) fn step(&self) -> WizardStep {
    self.state.step()
  }

  pub(crate) fn ensure_open(&self) -> WizardResult<()> {
    if self.closed {
      return Err(WizardError::Closed);
    }
    Ok(())
  }

  pub(crate) fn ensure_step(&self, allowed: &[WizardStep], action: &'static str) -> WizardResult<()> {
    self.ensure_open()?;
    let step = self.step();
    if !allowed.contains(&step) {
      return Err(WizardError::InvalidAction { action, step });
    }
    Ok(())
  }

  /// Guard for leaving the current step forwards.
  pub(crate) fn can_advance(&self) -> bool {
    let step = self.step();
    if !self.store.is_ready_to_advance(step) {
      return false;
    }
    step != WizardStep::ColumnSelection || self.store.validate_against(&self.snapshot).is_ok()
  }

  pub(crate) fn model_is_current(&self) -> bool {
    self
      .model
      .as_ref()
      .is_some_and(|m| m.is_current_for(self.store.selection()))
  }

  pub(crate) fn set_generation(&mut self, status: GenerationStatus) {
    if let StepState::ModelPreview { generation, .. } = &mut self.state {
      *generation = status;
    }
  }

  pub(crate) fn set_apply(&mut self, status: ApplyStatus) {
    if let StepState::ModelPreview { apply, .. } = &mut self.state {
      *apply = status;
    }
  }

  /// Keeps the preview's generation status in line with the selection after an
  /// in-place edit.
  fn selection_changed(&mut self) {
    let current = self.model_is_current();
    if let StepState::ModelPreview { generation, .. } = &mut self.state {
      match *generation {
        GenerationStatus::Ready if !current => *generation = GenerationStatus::Stale,
        GenerationStatus::Stale if current => *generation = GenerationStatus::Ready,
        _ => {}
      }
    }
  }
}

#[derive(Clone)]
pub struct WizardController {
  pub(crate) workflow_id: Uuid,
  pub(crate) data: StateCell<WizardData>,
  pub(crate) catalog: SchemaCatalogClient,
  pub(crate) coordinator: ColumnFetchCoordinator,
  pub(crate) generation: ModelGenerationService,
  pub(crate) apply: ModelApplyService,
}

impl WizardController {
  /// Creates a workflow in `TableSelection` with an empty selection and
  /// snapshot. Call [`WizardController::start`] to list the catalog's tables.
  pub fn new(services: WizardServices) -> Self {
    let catalog = SchemaCatalogClient::new(services.catalog);
    let workflow_id = Uuid::new_v4();
    event!(Level::DEBUG, %workflow_id, "Workflow created.");
    Self {
      workflow_id,
      data: StateCell::new(WizardData::default()),
      coordinator: ColumnFetchCoordinator::new(catalog.clone()),
      catalog,
      generation: ModelGenerationService::new(services.generator),
      apply: ModelApplyService::new(services.applier),
    }
  }

  pub fn workflow_id(&self) -> Uuid {
    self.workflow_id
  }

  pub fn step(&self) -> WizardStep {
    self.data.read().step()
  }

  pub fn selection(&self) -> Selection {
    self.data.read().store.selection().clone()
  }

  pub fn snapshot(&self) -> CatalogSnapshot {
    self.data.read().snapshot.clone()
  }

  pub fn is_closed(&self) -> bool {
    self.data.read().closed
  }

  /// Whether `advance` would move. Evaluated against the current selection;
  /// a `false` here only means the affordance is disabled.
  pub fn can_advance(&self) -> bool {
    let data = self.data.read();
    !data.closed && data.can_advance()
  }

  /// Read-only projection for the presentation layer.
  pub fn view(&self) -> WizardView {
    WizardView::project(self.workflow_id, &self.data.read())
  }

  /// Lists the catalog's tables. The entry side effect of `TableSelection`.
  #[instrument(name = "WizardController::start", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn start(&self) -> WizardResult<()> {
    self.list_tables("start").await
  }

  /// Lists the catalog's tables again, e.g. after a failed listing.
  #[instrument(name = "WizardController::refresh_tables", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn refresh_tables(&self) -> WizardResult<()> {
    self.list_tables("refresh_tables").await
  }

  async fn list_tables(&self, action: &'static str) -> WizardResult<()> {
    {
      let mut data = self.data.write();
      data.ensure_step(&[WizardStep::TableSelection], action)?;
      if data.listing_tables {
        event!(Level::DEBUG, "Table listing already in flight.");
        return Ok(());
      }
      data.listing_tables = true;
      data.state = StepState::TableSelection {
        listing: true,
        error: None,
      };
    }

    let result = self.catalog.list_tables().await;

    let mut data = self.data.write();
    data.listing_tables = false;
    if data.closed || data.step() != WizardStep::TableSelection {
      event!(Level::DEBUG, "Discarding table listing that arrived after leaving table selection.");
      return Ok(());
    }
    match result {
      Ok(tables) => {
        event!(Level::INFO, count = tables.len(), "Catalog tables loaded.");
        data.available_tables = tables;
        data.state = StepState::TableSelection {
          listing: false,
          error: None,
        };
      }
      Err(err) => {
        event!(Level::WARN, error = %err, "Table listing failed; showing no tables.");
        data.available_tables.clear();
        data.state = StepState::TableSelection {
          listing: false,
          error: Some(err.to_string()),
        };
      }
    }
    Ok(())
  }

  /// Flips a table's membership. Only available in `TableSelection`.
  ///
  /// Returns whether the table is selected afterwards.
  pub fn toggle_table(&self, table: &TableName) -> WizardResult<bool> {
    let mut data = self.data.write();
    data.ensure_step(&[WizardStep::TableSelection], "toggle_table")?;
    let selected = data.store.toggle_table(table);
    data.selection_changed();
    event!(Level::DEBUG, workflow_id = %self.workflow_id, %table, selected, "Table toggled.");
    Ok(selected)
  }

  /// Flips a column's membership. Available in `ColumnSelection` and, as an
  /// in-place edit that invalidates the generated model, in `ModelPreview`.
  ///
  /// Returns whether the column is selected afterwards; `false` without any
  /// change when the table itself is not selected. Rejected in `ModelPreview`
  /// with [`WizardError::ApplyInProgress`] while the model is being applied.
  pub fn toggle_column(&self, table: &TableName, column: &str) -> WizardResult<bool> {
    let mut data = self.data.write();
    data.ensure_step(
      &[WizardStep::ColumnSelection, WizardStep::ModelPreview],
      "toggle_column",
    )?;
    if data.applying && data.step() == WizardStep::ModelPreview {
      return Err(WizardError::ApplyInProgress);
    }
    if !data.store.selection().has_table(table) {
      return Ok(false);
    }
    let selected = data.store.toggle_column(table, column);
    data.selection_changed();
    event!(Level::DEBUG, workflow_id = %self.workflow_id, %table, column, selected, "Column toggled.");
    Ok(selected)
  }

  /// Expands or collapses a table's column list. Returns whether it is expanded afterwards.
  pub fn toggle_expanded(&self, table: &TableName) -> WizardResult<bool> {
    let mut data = self.data.write();
    data.ensure_step(&[WizardStep::ColumnSelection], "toggle_expanded")?;
    let StepState::ColumnSelection { expanded } = &mut data.state else {
      return Ok(false);
    };
    if expanded.remove(table) {
      Ok(false)
    } else {
      expanded.insert(table.clone());
      Ok(true)
    }
  }

  /// Ends the workflow, keeping its final state readable until the
  /// controller is dropped.
  #[instrument(name = "WizardController::done", skip_all, fields(workflow_id = %self.workflow_id))]
  pub fn done(&self) -> WizardResult<CompletedWorkflow> {
    let mut data = self.data.write();
    data.ensure_open()?;
    data.closed = true;
    event!(Level::INFO, step = %data.step(), "Workflow completed.");
    let model = data.model.clone().filter(|m| m.is_current_for(data.store.selection()));
    Ok(CompletedWorkflow {
      workflow_id: self.workflow_id,
      selection: data.store.selection().clone(),
      model,
      apply_outcome: data.last_apply.clone(),
    })
  }

  /// Abandons the workflow. Idempotent.
  pub fn cancel(&self) {
    let mut data = self.data.write();
    if !data.closed {
      data.closed = true;
      event!(Level::INFO, workflow_id = %self.workflow_id, step = %data.step(), "Workflow cancelled.");
    }
  }
}
