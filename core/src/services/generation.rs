// pipewright/src/services/generation.rs

use crate::error::{WizardError, WizardResult};
use crate::model::artifact::GeneratedModel;
use crate::model::selection::{Selection, TableColumns};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Text used when the generator answers with an empty model.
pub const EMPTY_MODEL_TEXT: &str = "No model returned.";

/// External service deriving a warehouse model from a table -> columns mapping.
#[async_trait]
pub trait ModelGenerator: Send + Sync + 'static {
  async fn generate_model(&self, mapping: &TableColumns) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct ModelGenerationService {
  generator: Arc<dyn ModelGenerator>,
}

impl ModelGenerationService {
  pub fn new(generator: Arc<dyn ModelGenerator>) -> Self {
    Self { generator }
  }

  #[instrument(
    name = "ModelGenerationService::generate",
    skip_all,
    fields(num_tables = selection.tables().len()),
    err(Display)
  )]
  pub async fn generate(&self, selection: &Selection) -> WizardResult<GeneratedModel> {
    let mapping = selection.mapping();
    let text = self
      .generator
      .generate_model(&mapping)
      .await
      .map_err(|err| WizardError::GenerationFailed {
        reason: failure_reason(&err),
      })?;

    let text = if text.trim().is_empty() {
      event!(Level::WARN, "Generator returned an empty model.");
      EMPTY_MODEL_TEXT.to_string()
    } else {
      text
    };
    event!(Level::INFO, model_len = text.len(), "Model generated.");
    Ok(GeneratedModel::new(text, selection))
  }
}

fn failure_reason(err: &anyhow::Error) -> String {
  let reason = format!("{err:#}");
  if reason.trim().is_empty() {
    "Failed to generate model.".to_string()
  } else {
    reason
  }
}
