// pipewright/src/services/apply.rs

use crate::model::artifact::{ApplyOutcome, ApplyResponse, GeneratedModel};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// External service materializing a generated model.
#[async_trait]
pub trait ModelApplier: Send + Sync + 'static {
  async fn apply_model(&self, model: &GeneratedModel) -> anyhow::Result<ApplyResponse>;
}

#[derive(Clone)]
pub struct ModelApplyService {
  applier: Arc<dyn ModelApplier>,
}

impl ModelApplyService {
  pub fn new(applier: Arc<dyn ModelApplier>) -> Self {
    Self { applier }
  }

  /// One apply attempt. Transport failures become [`ApplyOutcome::Failure`];
  /// nothing here is retried.
  #[instrument(name = "ModelApplyService::apply", skip_all, fields(num_tables = model.mapping.len()))]
  pub async fn apply(&self, model: &GeneratedModel) -> ApplyOutcome {
    let outcome = match self.applier.apply_model(model).await {
      Ok(resp) => ApplyOutcome::from(resp),
      Err(err) => ApplyOutcome::Failure(format!("{err:#}")),
    };
    match &outcome {
      ApplyOutcome::Success => event!(Level::INFO, "Model applied."),
      ApplyOutcome::PartialFailure(detail) => event!(Level::WARN, %detail, "Model partially applied."),
      ApplyOutcome::Failure(reason) => event!(Level::ERROR, %reason, "Model apply failed."),
    }
    outcome
  }
}
