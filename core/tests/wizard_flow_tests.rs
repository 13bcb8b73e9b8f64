// tests/wizard_flow_tests.rs
mod common;

use common::*;
use pipewright::{
  ApplyOutcome, ApplyStatus, GenerationStatus, StepState, Transition, WizardError, WizardStep,
};

#[tokio::test]
async fn test_end_to_end_single_table() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;

  wizard.start().await.unwrap();
  let view = wizard.view();
  assert_eq!(view.step, WizardStep::TableSelection);
  assert_eq!(view.available_tables, vec![table("orders"), table("users"), table("products")]);
  assert!(!view.loading);
  assert!(!view.can_advance);

  assert!(wizard.toggle_table(&table("orders")).unwrap());
  let moved = wizard.advance().await.unwrap();
  assert_eq!(
    moved,
    Transition::Moved {
      from: WizardStep::TableSelection,
      to: WizardStep::ColumnSelection
    }
  );

  let view = wizard.view();
  assert!(!view.loading);
  assert_eq!(view.columns_for(&table("orders")), vec!["id", "total", "user_id"]);
  assert_eq!(fx.catalog.column_calls("orders"), 1);
  assert!(!view.can_advance);

  wizard.toggle_column(&table("orders"), "id").unwrap();
  wizard.toggle_column(&table("orders"), "total").unwrap();
  assert!(wizard.can_advance());
  assert!(wizard.advance().await.unwrap().moved());

  let view = wizard.view();
  assert_eq!(view.step, WizardStep::ModelPreview);
  assert_eq!(
    view.state,
    StepState::ModelPreview {
      generation: GenerationStatus::Ready,
      apply: ApplyStatus::Idle
    }
  );
  assert!(view.model_is_current);
  assert_eq!(view.model.as_ref().unwrap().text, "model: orders(id,total)");
  assert_eq!(
    fx.generator.last_mapping().unwrap().get(&table("orders")),
    Some(&vec!["id".to_string(), "total".to_string()])
  );

  let outcome = wizard.apply().await.unwrap();
  assert_eq!(outcome, ApplyOutcome::Success);
  assert_eq!(fx.applier.calls(), 1);
  assert_eq!(
    wizard.view().state,
    StepState::ModelPreview {
      generation: GenerationStatus::Ready,
      apply: ApplyStatus::Finished(ApplyOutcome::Success)
    }
  );

  let completed = wizard.done().unwrap();
  assert_eq!(completed.workflow_id, wizard.workflow_id());
  assert_eq!(completed.apply_outcome, Some(ApplyOutcome::Success));
  assert_eq!(completed.model.unwrap().text, "model: orders(id,total)");
  assert!(wizard.is_closed());
  assert!(wizard.view().closed);
}

#[tokio::test]
async fn test_guard_blocks_advance_without_selection() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();

  let blocked = wizard.advance().await.unwrap();
  assert_eq!(
    blocked,
    Transition::Blocked {
      step: WizardStep::TableSelection
    }
  );
  assert_eq!(wizard.step(), WizardStep::TableSelection);
  assert_eq!(fx.catalog.total_column_calls(), 0);

  wizard.toggle_table(&table("orders")).unwrap();
  wizard.toggle_table(&table("users")).unwrap();
  wizard.advance().await.unwrap();

  wizard.toggle_column(&table("orders"), "id").unwrap();
  let blocked = wizard.advance().await.unwrap();
  assert_eq!(blocked.current(), WizardStep::ColumnSelection);
  assert!(!blocked.moved());
  assert_eq!(fx.generator.calls(), 0);

  // No step after the preview.
  wizard.toggle_column(&table("users"), "id").unwrap();
  wizard.advance().await.unwrap();
  let blocked = wizard.advance().await.unwrap();
  assert_eq!(
    blocked,
    Transition::Blocked {
      step: WizardStep::ModelPreview
    }
  );
}

#[tokio::test]
async fn test_back_preserves_column_choices() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();
  wizard.toggle_table(&table("orders")).unwrap();
  wizard.advance().await.unwrap();
  wizard.toggle_column(&table("orders"), "id").unwrap();
  wizard.toggle_column(&table("orders"), "total").unwrap();

  let back = wizard.back().await.unwrap();
  assert_eq!(
    back,
    Transition::Moved {
      from: WizardStep::ColumnSelection,
      to: WizardStep::TableSelection
    }
  );
  let selection = wizard.selection();
  assert!(selection.has_column(&table("orders"), "id"));
  assert!(selection.has_column(&table("orders"), "total"));

  // Re-entering reuses the loaded columns.
  wizard.advance().await.unwrap();
  assert_eq!(fx.catalog.column_calls("orders"), 1);
  assert!(wizard.can_advance());

  let blocked = fx.wizard.clone();
  blocked.back().await.unwrap();
  assert_eq!(
    blocked.back().await.unwrap(),
    Transition::Blocked {
      step: WizardStep::TableSelection
    }
  );
}

#[tokio::test]
async fn test_deselecting_table_purges_columns_and_snapshot() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();
  wizard.toggle_table(&table("orders")).unwrap();
  wizard.toggle_table(&table("users")).unwrap();
  wizard.advance().await.unwrap();
  wizard.toggle_column(&table("users"), "email").unwrap();
  wizard.toggle_column(&table("orders"), "id").unwrap();
  assert_eq!(wizard.snapshot().len(), 2);

  wizard.back().await.unwrap();
  assert!(!wizard.toggle_table(&table("users")).unwrap());
  assert!(wizard.selection().columns_for(&table("users")).is_none());

  wizard.advance().await.unwrap();
  let snapshot = wizard.snapshot();
  assert_eq!(snapshot.len(), 1);
  assert!(!snapshot.contains(&table("users")));
  assert!(wizard.can_advance());
}

#[tokio::test]
async fn test_catalog_unavailable_shows_empty_list_and_error() {
  setup_tracing();
  let fx = Fixture::with_catalog(ScriptedCatalog::new());
  let wizard = &fx.wizard;

  wizard.start().await.unwrap();
  let view = wizard.view();
  assert_eq!(view.step, WizardStep::TableSelection);
  assert!(view.available_tables.is_empty());
  assert!(!view.loading);
  let error = view.error.expect("listing error is surfaced");
  assert!(error.contains("connection refused"), "error was: {error}");

  fx.catalog.set_tables(Some(&["orders"]));
  wizard.refresh_tables().await.unwrap();
  let view = wizard.view();
  assert_eq!(view.available_tables, vec![table("orders")]);
  assert!(view.error.is_none());
  assert_eq!(fx.catalog.list_calls(), 2);
}

#[tokio::test]
async fn test_failed_table_renders_without_columns_and_can_be_retried() {
  setup_tracing();
  let catalog = shop_catalog().with_failing_table("products", "relation does not exist");
  let fx = Fixture::with_catalog(catalog);
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();
  wizard.toggle_table(&table("orders")).unwrap();
  wizard.toggle_table(&table("products")).unwrap();
  wizard.advance().await.unwrap();

  let view = wizard.view();
  assert!(!view.loading);
  assert!(view.snapshot.get(&table("products")).unwrap().is_failed());
  assert!(view.columns_for(&table("products")).is_empty());
  assert_eq!(view.columns_for(&table("orders")).len(), 3);

  fx.catalog.set_columns("products", &[("id", "int"), ("sku", "text")]);
  wizard.retry_table(&table("products")).await.unwrap();
  assert_eq!(fx.catalog.column_calls("products"), 2);
  assert_eq!(fx.catalog.column_calls("orders"), 1);
  assert_eq!(wizard.view().columns_for(&table("products")), vec!["id", "sku"]);
}

#[tokio::test]
async fn test_back_then_advance_reuses_current_model() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();
  wizard.toggle_table(&table("orders")).unwrap();
  wizard.advance().await.unwrap();
  wizard.toggle_column(&table("orders"), "id").unwrap();
  wizard.advance().await.unwrap();
  assert_eq!(fx.generator.calls(), 1);

  wizard.back().await.unwrap();
  wizard.advance().await.unwrap();
  assert_eq!(fx.generator.calls(), 1);
  assert!(wizard.view().model_is_current);

  // A changed selection does regenerate.
  wizard.back().await.unwrap();
  wizard.toggle_column(&table("orders"), "total").unwrap();
  wizard.advance().await.unwrap();
  assert_eq!(fx.generator.calls(), 2);
  assert_eq!(wizard.view().model.unwrap().text, "model: orders(id,total)");
}

#[tokio::test]
async fn test_generation_failure_then_successful_retry() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  fx.generator.fail_with("model service timed out");

  wizard.start().await.unwrap();
  wizard.toggle_table(&table("users")).unwrap();
  wizard.advance().await.unwrap();
  wizard.toggle_column(&table("users"), "id").unwrap();
  wizard.advance().await.unwrap();

  let view = wizard.view();
  assert_eq!(view.step, WizardStep::ModelPreview);
  assert!(view.model.is_none());
  assert_eq!(
    view.state,
    StepState::ModelPreview {
      generation: GenerationStatus::Failed("model service timed out".into()),
      apply: ApplyStatus::Idle
    }
  );
  assert_eq!(view.error.as_deref(), Some("model service timed out"));
  assert!(matches!(wizard.apply().await, Err(WizardError::ModelNotReady)));
  assert_eq!(fx.applier.calls(), 0);

  fx.generator.succeed();
  wizard.regenerate().await.unwrap();
  let view = wizard.view();
  assert!(view.error.is_none());
  assert!(view.model_is_current);
  assert_eq!(fx.generator.calls(), 2);
  assert_eq!(wizard.apply().await.unwrap(), ApplyOutcome::Success);
}

#[tokio::test]
async fn test_empty_generator_answer_uses_placeholder() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  fx.generator.answer_with("   ");
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();
  wizard.toggle_table(&table("orders")).unwrap();
  wizard.advance().await.unwrap();
  wizard.toggle_column(&table("orders"), "id").unwrap();
  wizard.advance().await.unwrap();

  assert_eq!(wizard.view().model.unwrap().text, pipewright::services::EMPTY_MODEL_TEXT);
}

#[tokio::test]
async fn test_actions_outside_their_step_are_rejected() {
  setup_tracing();
  let fx = Fixture::with_catalog(shop_catalog());
  let wizard = &fx.wizard;
  wizard.start().await.unwrap();

  assert!(matches!(
    wizard.toggle_column(&table("orders"), "id"),
    Err(WizardError::InvalidAction {
      action: "toggle_column",
      step: WizardStep::TableSelection
    })
  ));
  assert!(matches!(
    wizard.apply().await,
    Err(WizardError::InvalidAction { action: "apply", .. })
  ));

  wizard.toggle_table(&table("orders")).unwrap();
  wizard.advance().await.unwrap();
  assert!(matches!(
    wizard.toggle_table(&table("users")),
    Err(WizardError::InvalidAction { .. })
  ));
  assert!(matches!(
    wizard.refresh_tables().await,
    Err(WizardError::InvalidAction { .. })
  ));

  // Column toggles on unselected tables change nothing.
  assert!(!wizard.toggle_column(&table("users"), "email").unwrap());
  assert!(wizard.selection().columns_for(&table("users")).is_none());

  assert!(wizard.toggle_expanded(&table("orders")).unwrap());
  assert!(!wizard.toggle_expanded(&table("orders")).unwrap());
}
