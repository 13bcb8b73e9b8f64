// pipewright/src/wizard/preview.rs

//! Model generation and apply, orchestrated while in `ModelPreview`.

use crate::error::{WizardError, WizardResult};
use crate::model::artifact::ApplyOutcome;
use crate::state::step::{ApplyStatus, GenerationStatus, WizardStep};
use crate::wizard::controller::WizardController;
use tracing::{event, instrument, Level};

impl WizardController {
  /// Generates a model for the current selection unless the cached one is
  /// still current. Used to retry after a failure or after an in-place edit.
  #[instrument(name = "WizardController::regenerate", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn regenerate(&self) -> WizardResult<()> {
    self
      .data
      .read()
      .ensure_step(&[WizardStep::ModelPreview], "regenerate")?;
    self.generate_for_current().await;
    Ok(())
  }

  /// Applies the generated model. One attempt per call, never retried
  /// automatically.
  ///
  /// Fails with [`WizardError::StaleModel`] when the selection changed after
  /// generation, and with [`WizardError::ModelNotReady`] when there is no
  /// model yet. The outcome is returned and shown in the preview; the step
  /// does not change.
  #[instrument(name = "WizardController::apply", skip_all, fields(workflow_id = %self.workflow_id))]
  pub async fn apply(&self) -> WizardResult<ApplyOutcome> {
    let model = {
      let mut data = self.data.write();
      data.ensure_step(&[WizardStep::ModelPreview], "apply")?;
      if data.applying {
        return Err(WizardError::ApplyInProgress);
      }
      let model = match &data.model {
        None => return Err(WizardError::ModelNotReady),
        Some(m) if !m.is_current_for(data.store.selection()) => {
          event!(Level::WARN, "Refusing to apply a model generated for a different selection.");
          return Err(WizardError::StaleModel);
        }
        Some(m) => m.clone(),
      };
      data.applying = true;
      data.set_apply(ApplyStatus::Applying);
      model
    };

    let outcome = self.apply.apply(&model).await;

    let mut data = self.data.write();
    data.applying = false;
    if data.closed {
      event!(Level::DEBUG, "Discarding apply outcome that arrived after the workflow closed.");
      return Ok(outcome);
    }
    data.last_apply = Some(outcome.clone());
    if data.step() == WizardStep::ModelPreview {
      data.set_apply(ApplyStatus::Finished(outcome.clone()));
    }
    Ok(outcome)
  }

  /// The entry side effect of `ModelPreview`.
  ///
  /// Skips generation when the cached model was derived from the current
  /// selection, and when a generation for the same selection is already in
  /// flight.
  pub(crate) async fn generate_for_current(&self) {
    let (selection, key) = {
      let mut data = self.data.write();
      if data.closed || data.step() != WizardStep::ModelPreview {
        return;
      }
      if data.model_is_current() {
        event!(Level::DEBUG, "Reusing the model generated for this selection.");
        data.set_generation(GenerationStatus::Ready);
        return;
      }
      data.set_generation(GenerationStatus::Generating);
      let key = data.store.derivation_key();
      if !data.generating.insert(key.clone()) {
        event!(Level::DEBUG, "Generation for this selection already in flight.");
        return;
      }
      (data.store.selection().clone(), key)
    };

    let result = self.generation.generate(&selection).await;

    let mut data = self.data.write();
    data.generating.remove(&key);
    if data.closed || data.step() != WizardStep::ModelPreview {
      event!(Level::DEBUG, "Discarding generation result that arrived after leaving the preview.");
      return;
    }
    let current = data.store.derivation_key();
    if current != key {
      event!(Level::DEBUG, "Discarding generation result for an edited selection.");
      if !data.generating.contains(&current) && !data.model_is_current() {
        data.set_generation(GenerationStatus::Stale);
      }
      return;
    }
    match result {
      Ok(model) => {
        data.model = Some(model);
        data.set_generation(GenerationStatus::Ready);
      }
      Err(WizardError::GenerationFailed { reason }) => {
        event!(Level::WARN, %reason, "Model generation failed.");
        data.set_generation(GenerationStatus::Failed(reason));
      }
      Err(other) => {
        event!(Level::WARN, error = %other, "Model generation failed.");
        data.set_generation(GenerationStatus::Failed(other.to_string()));
      }
    }
  }
}
