// pipewright/src/model/selection.rs

//! The user's table and column choices, and the store that keeps them
//! consistent.

use crate::error::{WizardError, WizardResult};
use crate::model::snapshot::CatalogSnapshot;
use crate::model::table::TableName;
use crate::state::step::WizardStep;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{event, Level};

/// Table -> selected column names, the payload shape the model backends consume.
pub type TableColumns = BTreeMap<TableName, Vec<String>>;

/// Chosen tables and, per table, chosen columns.
///
/// Every key of `columns` is a member of `tables`. Only [`SelectionStore`]
/// mutates a selection, which is how that invariant is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
  tables: BTreeSet<TableName>,
  columns: BTreeMap<TableName, BTreeSet<String>>,
}

impl Selection {
  pub fn tables(&self) -> &BTreeSet<TableName> {
    &self.tables
  }

  pub fn has_table(&self, table: &TableName) -> bool {
    self.tables.contains(table)
  }

  pub fn columns_for(&self, table: &TableName) -> Option<&BTreeSet<String>> {
    self.columns.get(table)
  }

  pub fn has_column(&self, table: &TableName, column: &str) -> bool {
    self.columns.get(table).is_some_and(|cols| cols.contains(column))
  }

  pub fn is_empty(&self) -> bool {
    self.tables.is_empty()
  }

  /// Selected columns per selected table. Tables without columns map to an empty list.
  pub fn mapping(&self) -> TableColumns {
    self
      .tables
      .iter()
      .map(|t| {
        let cols = self
          .columns
          .get(t)
          .map(|c| c.iter().cloned().collect())
          .unwrap_or_default();
        (t.clone(), cols)
      })
      .collect()
  }

  /// Stable key identifying this exact selection.
  pub fn derivation_key(&self) -> DerivationKey {
    let object: Map<String, Value> = self
      .mapping()
      .into_iter()
      .map(|(t, cols)| {
        let cols = cols.into_iter().map(Value::String).collect();
        (t.to_string(), Value::Array(cols))
      })
      .collect();
    DerivationKey(Value::Object(object).to_string())
  }
}

/// Compact JSON rendering of a selection's table -> columns mapping.
///
/// Tables and columns are emitted in sorted order, so equal selections always
/// produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivationKey(String);

impl DerivationKey {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for DerivationKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Holds a [`Selection`] and enforces its invariants.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
  selection: Selection,
}

impl SelectionStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  /// Flips a table's membership. Returns whether the table is selected afterwards.
  ///
  /// Deselecting purges the table's column choices.
  pub fn toggle_table(&mut self, table: &TableName) -> bool {
    if self.selection.tables.contains(table) {
      self.deselect_table(table);
      false
    } else {
      self.select_table(table.clone());
      true
    }
  }

  /// Returns `true` if the selection changed.
  pub fn select_table(&mut self, table: TableName) -> bool {
    self.selection.tables.insert(table)
  }

  /// Returns `true` if the selection changed.
  pub fn deselect_table(&mut self, table: &TableName) -> bool {
    let removed = self.selection.tables.remove(table);
    self.selection.columns.remove(table);
    removed
  }

  /// Flips a column's membership for a selected table.
  ///
  /// Returns whether the column is selected afterwards. A no-op returning
  /// `false` when the table is not selected.
  pub fn toggle_column(&mut self, table: &TableName, column: &str) -> bool {
    if self.selection.has_column(table, column) {
      self.deselect_column(table, column);
      false
    } else {
      self.select_column(table, column)
    }
  }

  /// Returns `true` if the column is now selected.
  pub fn select_column(&mut self, table: &TableName, column: &str) -> bool {
    if !self.selection.tables.contains(table) {
      event!(Level::DEBUG, %table, column, "Ignoring column selection for unselected table.");
      return false;
    }
    self
      .selection
      .columns
      .entry(table.clone())
      .or_default()
      .insert(column.to_string());
    true
  }

  /// Returns `true` if the selection changed.
  pub fn deselect_column(&mut self, table: &TableName, column: &str) -> bool {
    let Some(cols) = self.selection.columns.get_mut(table) else {
      return false;
    };
    let removed = cols.remove(column);
    if cols.is_empty() {
      self.selection.columns.remove(table);
    }
    removed
  }

  /// Whether the selection satisfies the guard for leaving `from` forwards.
  pub fn is_ready_to_advance(&self, from: WizardStep) -> bool {
    match from {
      WizardStep::TableSelection => !self.selection.tables.is_empty(),
      WizardStep::ColumnSelection => self
        .selection
        .tables
        .iter()
        .all(|t| self.selection.columns.get(t).is_some_and(|c| !c.is_empty())),
      WizardStep::ModelPreview => false,
    }
  }

  /// Checks that every selected column exists in its table's loaded column list.
  ///
  /// Tables whose columns are not loaded yet are not checked.
  pub fn validate_against(&self, snapshot: &CatalogSnapshot) -> WizardResult<()> {
    for (table, cols) in &self.selection.columns {
      let Some(result) = snapshot.get(table) else {
        continue;
      };
      if !result.is_loaded() {
        continue;
      }
      let unknown: Vec<String> = cols.iter().filter(|c| !result.has_column(c)).cloned().collect();
      if !unknown.is_empty() {
        return Err(WizardError::UnknownColumns {
          table: table.clone(),
          columns: unknown,
        });
      }
    }
    Ok(())
  }

  pub fn derivation_key(&self) -> DerivationKey {
    self.selection.derivation_key()
  }
}
