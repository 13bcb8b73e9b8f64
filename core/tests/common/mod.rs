// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use pipewright::{
  ApplyResponse, CatalogBackend, ColumnDescriptor, GeneratedModel, ModelApplier, ModelGenerator, RawColumn,
  TableColumns, TableName, WizardController, WizardServices,
};
use std::collections::HashMap;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::Level;

// --- Scripted catalog ---

/// In-memory catalog whose answers, failures and timing are set per test.
///
/// Tables listed in `gates` do not answer until [`ScriptedCatalog::release`]
/// is called for them.
#[derive(Default)]
pub struct ScriptedCatalog {
  tables: Mutex<Option<Vec<TableName>>>,
  columns: Mutex<HashMap<String, Result<Vec<RawColumn>, String>>>,
  gates: Mutex<HashMap<String, Arc<Notify>>>,
  listing_gate: Mutex<Option<Arc<Notify>>>,
  column_calls: Mutex<HashMap<String, usize>>,
  list_calls: AtomicUsize,
}

impl ScriptedCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_tables(self, tables: &[&str]) -> Self {
    *self.tables.lock() = Some(tables.iter().map(|t| TableName::from(*t)).collect());
    self
  }

  pub fn with_columns(self, table: &str, columns: &[(&str, &str)]) -> Self {
    let cols = columns
      .iter()
      .map(|(name, ty)| RawColumn::from(ColumnDescriptor::new(*name, *ty)))
      .collect();
    self.columns.lock().insert(table.to_string(), Ok(cols));
    self
  }

  pub fn with_raw_columns(self, table: &str, columns: Vec<RawColumn>) -> Self {
    self.columns.lock().insert(table.to_string(), Ok(columns));
    self
  }

  pub fn with_failing_table(self, table: &str, message: &str) -> Self {
    self.columns.lock().insert(table.to_string(), Err(message.to_string()));
    self
  }

  /// Makes column requests for `table` wait for [`ScriptedCatalog::release`].
  pub fn gated(self, table: &str) -> Self {
    self.gates.lock().insert(table.to_string(), Arc::new(Notify::new()));
    self
  }

  /// Makes table listings wait for [`ScriptedCatalog::release_listing`].
  pub fn gated_listing(self) -> Self {
    *self.listing_gate.lock() = Some(Arc::new(Notify::new()));
    self
  }

  pub fn set_tables(&self, tables: Option<&[&str]>) {
    *self.tables.lock() = tables.map(|ts| ts.iter().map(|t| TableName::from(*t)).collect());
  }

  pub fn set_columns(&self, table: &str, columns: &[(&str, &str)]) {
    let cols = columns
      .iter()
      .map(|(name, ty)| RawColumn::from(ColumnDescriptor::new(*name, *ty)))
      .collect();
    self.columns.lock().insert(table.to_string(), Ok(cols));
  }

  pub fn release(&self, table: &str) {
    if let Some(gate) = self.gates.lock().get(table) {
      gate.notify_one();
    }
  }

  pub fn release_listing(&self) {
    if let Some(gate) = self.listing_gate.lock().as_ref() {
      gate.notify_one();
    }
  }

  pub fn column_calls(&self, table: &str) -> usize {
    self.column_calls.lock().get(table).copied().unwrap_or(0)
  }

  pub fn total_column_calls(&self) -> usize {
    self.column_calls.lock().values().sum()
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl CatalogBackend for ScriptedCatalog {
  async fn list_tables(&self) -> anyhow::Result<Vec<TableName>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    let gate = self.listing_gate.lock().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    let tables = self.tables.lock().clone();
    tables.ok_or_else(|| anyhow!("connection refused"))
  }

  async fn list_columns(&self, table: &TableName) -> anyhow::Result<Vec<RawColumn>> {
    *self.column_calls.lock().entry(table.to_string()).or_insert(0) += 1;
    let gate = self.gates.lock().get(table.as_str()).cloned();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    let scripted = self.columns.lock().get(table.as_str()).cloned();
    match scripted {
      Some(Ok(cols)) => Ok(cols),
      Some(Err(message)) => Err(anyhow!(message)),
      None => Err(anyhow!("table '{}' does not exist", table)),
    }
  }
}

// --- Scripted generator ---

#[derive(Default)]
pub struct ScriptedGenerator {
  calls: AtomicUsize,
  failure: Mutex<Option<String>>,
  text: Mutex<Option<String>>,
  gate: Mutex<Option<Arc<Notify>>>,
  last_mapping: Mutex<Option<TableColumns>>,
}

impl ScriptedGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn gated(self) -> Self {
    *self.gate.lock() = Some(Arc::new(Notify::new()));
    self
  }

  pub fn fail_with(&self, message: &str) {
    *self.failure.lock() = Some(message.to_string());
  }

  pub fn succeed(&self) {
    *self.failure.lock() = None;
  }

  pub fn answer_with(&self, text: &str) {
    *self.text.lock() = Some(text.to_string());
  }

  pub fn release(&self) {
    if let Some(gate) = self.gate.lock().as_ref() {
      gate.notify_one();
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_mapping(&self) -> Option<TableColumns> {
    self.last_mapping.lock().clone()
  }
}

/// Renders a mapping as `table(col,col); table(col)`.
pub fn describe_mapping(mapping: &TableColumns) -> String {
  mapping
    .iter()
    .map(|(t, cols)| format!("{}({})", t, cols.join(",")))
    .collect::<Vec<_>>()
    .join("; ")
}

#[async_trait]
impl ModelGenerator for ScriptedGenerator {
  async fn generate_model(&self, mapping: &TableColumns) -> anyhow::Result<String> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_mapping.lock() = Some(mapping.clone());
    let gate = self.gate.lock().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    if let Some(message) = self.failure.lock().clone() {
      return Err(anyhow!(message));
    }
    let text = self.text.lock().clone();
    Ok(text.unwrap_or_else(|| format!("model: {}", describe_mapping(mapping))))
  }
}

// --- Scripted applier ---

pub struct ScriptedApplier {
  calls: AtomicUsize,
  response: Mutex<Result<ApplyResponse, String>>,
  gate: Mutex<Option<Arc<Notify>>>,
  applied: Mutex<Vec<GeneratedModel>>,
}

impl Default for ScriptedApplier {
  fn default() -> Self {
    Self {
      calls: AtomicUsize::new(0),
      response: Mutex::new(Ok(ApplyResponse::ok())),
      gate: Mutex::new(None),
      applied: Mutex::new(Vec::new()),
    }
  }
}

impl ScriptedApplier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn gated(self) -> Self {
    *self.gate.lock() = Some(Arc::new(Notify::new()));
    self
  }

  pub fn respond_with(&self, response: ApplyResponse) {
    *self.response.lock() = Ok(response);
  }

  pub fn fail_transport(&self, message: &str) {
    *self.response.lock() = Err(message.to_string());
  }

  pub fn release(&self) {
    if let Some(gate) = self.gate.lock().as_ref() {
      gate.notify_one();
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn applied(&self) -> Vec<GeneratedModel> {
    self.applied.lock().clone()
  }
}

#[async_trait]
impl ModelApplier for ScriptedApplier {
  async fn apply_model(&self, model: &GeneratedModel) -> anyhow::Result<ApplyResponse> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let gate = self.gate.lock().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    self.applied.lock().push(model.clone());
    let response = self.response.lock().clone();
    response.map_err(|message| anyhow!(message))
  }
}

// --- Fixture ---

/// A controller wired to scripted backends the test keeps handles to.
pub struct Fixture {
  pub catalog: Arc<ScriptedCatalog>,
  pub generator: Arc<ScriptedGenerator>,
  pub applier: Arc<ScriptedApplier>,
  pub wizard: WizardController,
}

impl Fixture {
  pub fn new(catalog: ScriptedCatalog, generator: ScriptedGenerator, applier: ScriptedApplier) -> Self {
    let catalog = Arc::new(catalog);
    let generator = Arc::new(generator);
    let applier = Arc::new(applier);
    let services = WizardServices::new(catalog.clone(), generator.clone(), applier.clone());
    Self {
      wizard: WizardController::new(services),
      catalog,
      generator,
      applier,
    }
  }

  pub fn with_catalog(catalog: ScriptedCatalog) -> Self {
    Self::new(catalog, ScriptedGenerator::new(), ScriptedApplier::new())
  }
}

/// The orders/users/products catalog most tests start from.
pub fn shop_catalog() -> ScriptedCatalog {
  ScriptedCatalog::new()
    .with_tables(&["orders", "users", "products"])
    .with_columns("orders", &[("id", "int"), ("total", "numeric"), ("user_id", "int")])
    .with_columns("users", &[("id", "int"), ("email", "text"), ("name", "text")])
    .with_columns("products", &[("id", "int"), ("sku", "text")])
}

pub fn table(name: &str) -> TableName {
  TableName::from(name)
}

/// Polls `cond` until it holds. Panics after roughly two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
  for _ in 0..1000 {
    if cond() {
      return;
    }
    tokio::time::sleep(Duration::from_millis(2)).await;
  }
  panic!("condition not reached in time");
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
