// demos/pipewright_console/src/script.rs

//! Drives one workflow non-interactively from the console configuration.

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use pipewright::{
  ApplyOutcome, CompletedWorkflow, GenerationStatus, StepState, TableName, Transition, WizardController,
  WizardServices,
};
use tracing::{info, instrument, warn};

#[instrument(name = "script::run", skip_all)]
pub async fn run(config: &AppConfig, services: WizardServices) -> AppResult<CompletedWorkflow> {
  let wizard = WizardController::new(services);
  info!(workflow_id = %wizard.workflow_id(), "Workflow started.");

  let result = drive(config, &wizard).await;
  if result.is_err() {
    wizard.cancel();
  }
  result
}

async fn drive(config: &AppConfig, wizard: &WizardController) -> AppResult<CompletedWorkflow> {
  // --- Table selection ---
  wizard.start().await?;
  let view = wizard.view();
  if view.available_tables.is_empty() {
    let reason = view.error.unwrap_or_else(|| "the catalog listed no tables".to_string());
    return Err(AppError::Internal(format!("Nothing to select: {}", reason)));
  }
  println!("Tables: {}", join(&view.available_tables));

  let wanted: Vec<TableName> = match &config.tables {
    Some(names) => names.iter().map(|n| TableName::from(n.as_str())).collect(),
    None => view.available_tables.clone(),
  };
  for table in &wanted {
    if !view.available_tables.contains(table) {
      warn!(%table, "Configured table is not in the catalog; skipping.");
      continue;
    }
    wizard.toggle_table(table)?;
  }
  expect_moved(wizard.advance().await?, "select at least one table")?;

  // --- Column selection ---
  let failed = failed_tables(wizard);
  for table in &failed {
    warn!(%table, "No columns available; retrying once.");
    wizard.retry_table(table).await?;
  }
  let still_failed = failed_tables(wizard);
  if !still_failed.is_empty() {
    warn!(tables = %join(&still_failed), "Dropping tables whose columns could not be listed.");
    wizard.back().await?;
    for table in &still_failed {
      wizard.toggle_table(table)?;
    }
    expect_moved(wizard.advance().await?, "every table failed to list its columns")?;
  }

  let view = wizard.view();
  for table in view.selection.tables() {
    let offered = view.columns_for(table);
    println!("{}: {}", table, offered.join(", "));
    let chosen: Vec<String> = match config.columns.as_ref().and_then(|m| m.get(table.as_str())) {
      Some(cols) => cols.clone(),
      None => offered.iter().map(|c| c.to_string()).collect(),
    };
    for column in &chosen {
      if !offered.contains(&column.as_str()) {
        warn!(%table, %column, "Configured column is not offered; skipping.");
        continue;
      }
      wizard.toggle_column(table, column)?;
    }
  }
  expect_moved(wizard.advance().await?, "choose at least one column for every table")?;

  // --- Model preview ---
  if matches!(generation(wizard), Some(GenerationStatus::Failed(_))) {
    warn!("Model generation failed; regenerating once.");
    wizard.regenerate().await?;
  }
  if let Some(GenerationStatus::Failed(reason)) = generation(wizard) {
    return Err(AppError::Internal(format!("Model generation failed: {}", reason)));
  }
  if let Some(model) = wizard.view().model {
    println!("\n{}", model.text);
  }

  if config.apply {
    match wizard.apply().await? {
      ApplyOutcome::Success => println!("Apply: success"),
      ApplyOutcome::PartialFailure(detail) => println!("Apply: partial failure: {}", detail),
      ApplyOutcome::Failure(reason) => println!("Apply: failed: {}", reason),
    }
  }

  Ok(wizard.done()?)
}

fn failed_tables(wizard: &WizardController) -> Vec<TableName> {
  wizard
    .snapshot()
    .iter()
    .filter(|(_, result)| result.is_failed())
    .map(|(table, _)| table.clone())
    .collect()
}

fn generation(wizard: &WizardController) -> Option<GenerationStatus> {
  match wizard.view().state {
    StepState::ModelPreview { generation, .. } => Some(generation),
    _ => None,
  }
}

fn expect_moved(transition: Transition, hint: &str) -> AppResult<()> {
  match transition {
    Transition::Moved { .. } => Ok(()),
    Transition::Blocked { step } => Err(AppError::Internal(format!("Stuck at {}: {}", step, hint))),
  }
}

fn join(tables: &[TableName]) -> String {
  tables.iter().map(TableName::as_str).collect::<Vec<_>>().join(", ")
}
