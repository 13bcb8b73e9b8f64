// pipewright/src/model/snapshot.rs

//! The workflow's local, possibly partial, view of the catalog for the
//! currently selected tables.

use crate::model::table::{ColumnDescriptor, TableName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of listing one table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ColumnFetchResult {
  /// Requested (or about to be), no answer yet.
  Pending,
  Loaded(Vec<ColumnDescriptor>),
  /// The table's columns could not be listed. Rendered as "no columns available".
  Failed(String),
}

impl ColumnFetchResult {
  pub fn is_settled(&self) -> bool {
    !matches!(self, ColumnFetchResult::Pending)
  }

  pub fn is_loaded(&self) -> bool {
    matches!(self, ColumnFetchResult::Loaded(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, ColumnFetchResult::Failed(_))
  }

  /// Columns available for selection. Empty unless loaded.
  pub fn columns(&self) -> &[ColumnDescriptor] {
    match self {
      ColumnFetchResult::Loaded(cols) => cols,
      _ => &[],
    }
  }

  pub fn has_column(&self, name: &str) -> bool {
    self.columns().iter().any(|c| c.name == name)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
  entries: BTreeMap<TableName, ColumnFetchResult>,
}

impl CatalogSnapshot {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, table: &TableName) -> Option<&ColumnFetchResult> {
    self.entries.get(table)
  }

  pub fn contains(&self, table: &TableName) -> bool {
    self.entries.contains_key(table)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&TableName, &ColumnFetchResult)> {
    self.entries.iter()
  }

  pub fn tables(&self) -> impl Iterator<Item = &TableName> {
    self.entries.keys()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn record(&mut self, table: TableName, result: ColumnFetchResult) {
    self.entries.insert(table, result);
  }

  pub fn mark_pending(&mut self, table: TableName) {
    self.entries.insert(table, ColumnFetchResult::Pending);
  }

  /// Drops a table's entry so the next fetch for it goes to the backend.
  pub fn invalidate(&mut self, table: &TableName) -> Option<ColumnFetchResult> {
    self.entries.remove(table)
  }

  /// Complete once every entry has settled, successfully or not.
  pub fn is_complete(&self) -> bool {
    self.entries.values().all(ColumnFetchResult::is_settled)
  }

  pub fn pending_tables(&self) -> Vec<TableName> {
    self
      .entries
      .iter()
      .filter(|(_, r)| !r.is_settled())
      .map(|(t, _)| t.clone())
      .collect()
  }

  /// Columns of a loaded table; empty for pending, failed or unknown tables.
  pub fn columns_for(&self, table: &TableName) -> &[ColumnDescriptor] {
    match self.entries.get(table) {
      Some(result) => result.columns(),
      None => &[],
    }
  }
}

impl FromIterator<(TableName, ColumnFetchResult)> for CatalogSnapshot {
  fn from_iter<I: IntoIterator<Item = (TableName, ColumnFetchResult)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}
