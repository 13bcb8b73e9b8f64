// src/lib.rs

//! Pipewright: a stateful, asynchronous engine for defining data pipelines.
//!
//! A pipeline definition is built in three steps:
//!  - pick source tables from a schema catalog,
//!  - pick columns of each table (fetched concurrently, failures isolated per table),
//!  - generate a warehouse model from the selection and optionally apply it.
//!
//! The [`WizardController`] drives one such workflow. Backends are supplied as
//! `async_trait` objects ([`CatalogBackend`], [`ModelGenerator`],
//! [`ModelApplier`]) bundled in [`WizardServices`]; the engine never talks to a
//! network or database on its own.
//!
//! ```no_run
//! # async fn demo(services: pipewright::WizardServices) -> pipewright::WizardResult<()> {
//! use pipewright::{TableName, WizardController};
//!
//! let wizard = WizardController::new(services);
//! wizard.start().await?;
//! wizard.toggle_table(&TableName::from("orders"))?;
//! wizard.advance().await?;
//! wizard.toggle_column(&TableName::from("orders"), "id")?;
//! wizard.advance().await?;
//! let outcome = wizard.apply().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod model;
pub mod services;
pub mod state;
pub mod wizard;

// --- Re-exports for the Public API ---

pub use crate::wizard::{CompletedWorkflow, WizardController, WizardView};

pub use crate::model::{
  ApplyOutcome, ApplyResponse, CatalogSnapshot, ColumnDescriptor, ColumnFetchResult, DerivationKey,
  GeneratedModel, RawColumn, Selection, SelectionStore, TableColumns, TableName,
};

pub use crate::services::{
  CatalogBackend, ModelApplier, ModelApplyService, ModelGenerationService, ModelGenerator,
  SchemaCatalogClient, WizardServices,
};

pub use crate::fetch::{ColumnFetchCoordinator, FetchPlan};

pub use crate::state::{ApplyStatus, GenerationStatus, StateCell, StepState, Transition, WizardStep};

pub use crate::error::{WizardError, WizardResult};
