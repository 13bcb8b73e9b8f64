// pipewright/src/services/catalog.rs

//! Access to the external schema catalog.

use crate::error::{WizardError, WizardResult};
use crate::model::table::{ColumnDescriptor, RawColumn, TableName};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// A backend that can list tables and their columns.
///
/// Implementations live outside the engine (HTTP client, in-memory fixture, ...)
/// and report failures as plain `anyhow` errors.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
  async fn list_tables(&self) -> anyhow::Result<Vec<TableName>>;

  /// Columns of `table`, either as bare names or as descriptors.
  async fn list_columns(&self, table: &TableName) -> anyhow::Result<Vec<RawColumn>>;
}

/// Engine-side adapter over a [`CatalogBackend`]: types its failures and
/// normalizes its column entries.
#[derive(Clone)]
pub struct SchemaCatalogClient {
  backend: Arc<dyn CatalogBackend>,
}

impl SchemaCatalogClient {
  pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
    Self { backend }
  }

  /// Lists tables in backend order with duplicates removed.
  #[instrument(name = "SchemaCatalogClient::list_tables", skip_all, err(Display))]
  pub async fn list_tables(&self) -> WizardResult<Vec<TableName>> {
    let listed = self
      .backend
      .list_tables()
      .await
      .map_err(|source| WizardError::CatalogUnavailable { source })?;

    let mut seen = HashSet::with_capacity(listed.len());
    let mut tables = Vec::with_capacity(listed.len());
    for table in listed {
      if seen.insert(table.clone()) {
        tables.push(table);
      } else {
        event!(Level::WARN, %table, "Catalog listed a table more than once; keeping the first.");
      }
    }
    event!(Level::DEBUG, count = tables.len(), "Tables listed.");
    Ok(tables)
  }

  #[instrument(name = "SchemaCatalogClient::list_columns", skip_all, fields(table = %table), err(Display))]
  pub async fn list_columns(&self, table: &TableName) -> WizardResult<Vec<ColumnDescriptor>> {
    let raw = self
      .backend
      .list_columns(table)
      .await
      .map_err(|source| WizardError::TableUnavailable {
        table: table.clone(),
        source,
      })?;
    let columns: Vec<ColumnDescriptor> = raw.into_iter().map(RawColumn::normalize).collect();
    event!(Level::DEBUG, count = columns.len(), "Columns listed.");
    Ok(columns)
  }
}
