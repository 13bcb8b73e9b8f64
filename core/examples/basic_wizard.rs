// pipewright/examples/basic_wizard.rs

use async_trait::async_trait;
use pipewright::{
  ApplyResponse, CatalogBackend, ColumnDescriptor, GeneratedModel, ModelApplier, ModelGenerator, RawColumn,
  TableColumns, TableName, WizardController, WizardError, WizardServices,
};
use std::sync::Arc;
use tracing::info;

// 1. An in-memory backend standing in for the catalog, generator and applier.
struct InMemoryBackend;

#[async_trait]
impl CatalogBackend for InMemoryBackend {
  async fn list_tables(&self) -> anyhow::Result<Vec<TableName>> {
    Ok(vec!["orders".into(), "users".into(), "audit_log".into()])
  }

  async fn list_columns(&self, table: &TableName) -> anyhow::Result<Vec<RawColumn>> {
    match table.as_str() {
      "orders" => Ok(vec![
        ColumnDescriptor::new("id", "int").into(),
        ColumnDescriptor::new("total", "numeric").into(),
      ]),
      "users" => Ok(vec!["id".into(), "email".into()]), // bare names, type "unknown"
      other => Err(anyhow::anyhow!("permission denied for table {}", other)),
    }
  }
}

#[async_trait]
impl ModelGenerator for InMemoryBackend {
  async fn generate_model(&self, mapping: &TableColumns) -> anyhow::Result<String> {
    let lines: Vec<String> = mapping
      .iter()
      .map(|(t, cols)| format!("table {} ({})", t, cols.join(", ")))
      .collect();
    Ok(lines.join("\n"))
  }
}

#[async_trait]
impl ModelApplier for InMemoryBackend {
  async fn apply_model(&self, _model: &GeneratedModel) -> anyhow::Result<ApplyResponse> {
    Ok(ApplyResponse::ok())
  }
}

#[tokio::main]
async fn main() -> Result<(), WizardError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Wizard Example ---");

  // 2. Create a workflow over the backend.
  let wizard = WizardController::new(WizardServices::from_backend(Arc::new(InMemoryBackend)));

  // 3. TableSelection: list tables, pick some.
  wizard.start().await?;
  info!("Available tables: {:?}", wizard.view().available_tables);
  for table in ["orders", "users", "audit_log"] {
    wizard.toggle_table(&table.into())?;
  }

  // 4. ColumnSelection: columns are fetched concurrently on entry.
  wizard.advance().await?;
  for (table, result) in wizard.snapshot().iter() {
    info!("{} -> {:?}", table, result);
  }

  // audit_log has no columns to offer, so go back and drop it.
  wizard.back().await?;
  wizard.toggle_table(&"audit_log".into())?;
  wizard.advance().await?;

  wizard.toggle_column(&"orders".into(), "id")?;
  wizard.toggle_column(&"orders".into(), "total")?;
  wizard.toggle_column(&"users".into(), "email")?;

  // 5. ModelPreview: the model is generated on entry.
  let transition = wizard.advance().await?;
  info!("Transition: {:?}", transition);
  if let Some(model) = wizard.view().model {
    info!("Generated model:\n{}", model.text);
  }

  let outcome = wizard.apply().await?;
  info!("Apply outcome: {:?}", outcome);

  let completed = wizard.done()?;
  info!("Completed workflow {}", completed.workflow_id);
  Ok(())
}
