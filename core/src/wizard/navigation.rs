// pipewright/src/wizard/navigation.rs

//! Forward/backward transitions and the column-fetch side effect of entering
//! `ColumnSelection`.

use crate::error::WizardResult;
use crate::fetch::ColumnFetchCoordinator;
use crate::model::snapshot::ColumnFetchResult;
use crate::model::table::TableName;
use crate::state::control::Transition;
use crate::state::step::{StepState, WizardStep};
use crate::wizard::controller::WizardController;
use tracing::{event, instrument, Level};

impl WizardController {
  /// Moves to the next step if the current step's guard holds, then runs the
  /// new step's entry side effect (column fetch or model generation).
  ///
  /// A failed guard is not an error: it yields [`Transition::Blocked`] and
  /// leaves the state unchanged.
  #[instrument(name = "WizardController::advance", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn advance(&self) -> WizardResult<Transition> {
    let (from, to) = {
      let mut data = self.data.write();
      data.ensure_open()?;
      let from = data.step();
      let Some(to) = from.next() else {
        return Ok(Transition::Blocked { step: from });
      };
      if !data.can_advance() {
        event!(Level::DEBUG, step = %from, "Advance blocked by guard.");
        return Ok(Transition::Blocked { step: from });
      }
      data.state = StepState::entering(to);
      (from, to)
    };
    event!(Level::INFO, %from, %to, "Advanced.");
    self.enter(to).await;
    Ok(Transition::Moved { from, to })
  }

  /// Moves to the previous step. Selections are kept.
  #[instrument(name = "WizardController::back", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn back(&self) -> WizardResult<Transition> {
    let (from, to) = {
      let mut data = self.data.write();
      data.ensure_open()?;
      let from = data.step();
      let Some(to) = from.previous() else {
        return Ok(Transition::Blocked { step: from });
      };
      data.state = match to {
        WizardStep::TableSelection => StepState::TableSelection {
          listing: data.listing_tables,
          error: None,
        },
        other => StepState::entering(other),
      };
      (from, to)
    };
    event!(Level::INFO, %from, %to, "Went back.");
    self.enter(to).await;
    Ok(Transition::Moved { from, to })
  }

  async fn enter(&self, step: WizardStep) {
    match step {
      WizardStep::TableSelection => {}
      WizardStep::ColumnSelection => self.load_columns().await,
      WizardStep::ModelPreview => self.generate_for_current().await,
    }
  }

  /// Forgets one table's column result and fetches it again.
  ///
  /// A no-op for unselected tables and tables already being fetched.
  #[instrument(name = "WizardController::retry_table", skip_all, fields(workflow_id = %self.workflow_id, %table))]
  pub async fn retry_table(&self, table: &TableName) -> WizardResult<()> {
    {
      let mut data = self.data.write();
      data.ensure_step(&[WizardStep::ColumnSelection], "retry_table")?;
      if !data.store.selection().has_table(table) || data.columns_in_flight.contains(table) {
        return Ok(());
      }
      data.snapshot.invalidate(table);
    }
    self.load_columns().await;
    Ok(())
  }

  /// Brings the snapshot in line with the selected tables and fetches every
  /// table that is neither known nor already being fetched.
  async fn load_columns(&self) {
    let to_fetch = {
      let mut data = self.data.write();
      let plan = ColumnFetchCoordinator::plan(data.store.selection().tables(), &data.snapshot);
      data.snapshot = plan.snapshot;
      let to_fetch: Vec<TableName> = plan
        .to_fetch
        .into_iter()
        .filter(|t| !data.columns_in_flight.contains(t))
        .collect();
      data.columns_in_flight.extend(to_fetch.iter().cloned());
      to_fetch
    };
    if to_fetch.is_empty() {
      event!(Level::DEBUG, "Every selected table is known or already being fetched.");
      return;
    }
    self
      .coordinator
      .fetch_each(to_fetch, |table, result| self.record_columns(table, result))
      .await;
  }

  fn record_columns(&self, table: TableName, result: ColumnFetchResult) {
    let mut data = self.data.write();
    data.columns_in_flight.remove(&table);
    if data.closed || data.step() != WizardStep::ColumnSelection || !data.store.selection().has_table(&table) {
      event!(Level::DEBUG, %table, "Discarding column result that arrived after leaving column selection.");
      return;
    }
    data.snapshot.record(table, result);
  }
}
