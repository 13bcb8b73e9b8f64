// pipewright/src/model/mod.rs

//! Data types shared by the workflow engine and its collaborators.

pub mod artifact;
pub mod selection;
pub mod snapshot;
pub mod table;

pub use artifact::{ApplyOutcome, ApplyResponse, GeneratedModel};
pub use selection::{DerivationKey, Selection, SelectionStore, TableColumns};
pub use snapshot::{CatalogSnapshot, ColumnFetchResult};
pub use table::{ColumnDescriptor, RawColumn, TableName, UNKNOWN_COLUMN_TYPE};
