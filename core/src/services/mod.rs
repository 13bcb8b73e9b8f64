// pipewright/src/services/mod.rs

//! Adapters over the external collaborators the workflow consumes: the schema
//! catalog, the model generator and the model applier.
//!
//! Each collaborator is an `async_trait` object supplied by the host; the
//! engine-side service wraps it, types its failures and logs the call.

pub mod apply;
pub mod catalog;
pub mod generation;

pub use apply::{ModelApplier, ModelApplyService};
pub use catalog::{CatalogBackend, SchemaCatalogClient};
pub use generation::{ModelGenerationService, ModelGenerator, EMPTY_MODEL_TEXT};

use std::sync::Arc;

/// The collaborators a workflow needs, bundled for [`crate::WizardController::new`].
#[derive(Clone)]
pub struct WizardServices {
  pub catalog: Arc<dyn CatalogBackend>,
  pub generator: Arc<dyn ModelGenerator>,
  pub applier: Arc<dyn ModelApplier>,
}

impl WizardServices {
  pub fn new(
    catalog: Arc<dyn CatalogBackend>,
    generator: Arc<dyn ModelGenerator>,
    applier: Arc<dyn ModelApplier>,
  ) -> Self {
    Self {
      catalog,
      generator,
      applier,
    }
  }

  /// Uses one object for all three roles.
  pub fn from_backend<B>(backend: Arc<B>) -> Self
  where
    B: CatalogBackend + ModelGenerator + ModelApplier,
  {
    Self {
      catalog: backend.clone(),
      generator: backend.clone(),
      applier: backend,
    }
  }
}
