// pipewright/src/model/table.rs

//! Table and column identifiers as reported by the schema catalog.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Type reported for a column when the backend cannot supply one.
pub const UNKNOWN_COLUMN_TYPE: &str = "unknown";

/// Opaque table identifier, unique within one catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
  pub fn new(name: impl Into<String>) -> Self {
    TableName(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TableName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TableName {
  fn from(s: &str) -> Self {
    TableName(s.to_string())
  }
}

impl From<String> for TableName {
  fn from(s: String) -> Self {
    TableName(s)
  }
}

impl Borrow<str> for TableName {
  fn borrow(&self) -> &str {
    &self.0
  }
}

/// A column of a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
  pub name: String,
  #[serde(rename = "type", default = "unknown_type")]
  pub data_type: String,
}

fn unknown_type() -> String {
  UNKNOWN_COLUMN_TYPE.to_string()
}

impl ColumnDescriptor {
  pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      data_type: data_type.into(),
    }
  }

  /// A column whose type the backend did not report.
  pub fn untyped(name: impl Into<String>) -> Self {
    Self::new(name, UNKNOWN_COLUMN_TYPE)
  }
}

/// A column entry exactly as a catalog backend returned it.
///
/// Backends are inconsistent: some list bare column names, others full
/// `{ "name": .., "type": .. }` objects. Both decode into this enum and are
/// normalized with [`RawColumn::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawColumn {
  Name(String),
  Descriptor {
    name: String,
    #[serde(rename = "type", default)]
    data_type: Option<String>,
  },
}

impl RawColumn {
  pub fn normalize(self) -> ColumnDescriptor {
    match self {
      RawColumn::Name(name) => ColumnDescriptor::untyped(name),
      RawColumn::Descriptor { name, data_type } => match data_type {
        Some(t) if !t.trim().is_empty() => ColumnDescriptor::new(name, t),
        _ => ColumnDescriptor::untyped(name),
      },
    }
  }
}

impl From<&str> for RawColumn {
  fn from(name: &str) -> Self {
    RawColumn::Name(name.to_string())
  }
}

impl From<ColumnDescriptor> for RawColumn {
  fn from(col: ColumnDescriptor) -> Self {
    RawColumn::Descriptor {
      name: col.name,
      data_type: Some(col.data_type),
    }
  }
}
