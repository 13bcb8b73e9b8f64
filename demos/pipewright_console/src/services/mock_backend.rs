// demos/pipewright_console/src/services/mock_backend.rs

use anyhow::anyhow;
use async_trait::async_trait;
use pipewright::{
  ApplyResponse, CatalogBackend, ColumnDescriptor, GeneratedModel, ModelApplier, ModelGenerator, RawColumn,
  TableColumns, TableName,
};
use std::time::Duration;
use tracing::{info, instrument};

/// Table whose column listing always fails, to show per-table isolation.
pub const BROKEN_TABLE: &str = "legacy_events";

/// In-memory demo catalog with simulated network latency.
pub struct MockBackend {
  latency: Duration,
}

impl MockBackend {
  pub fn new(latency: Duration) -> Self {
    Self { latency }
  }

  async fn simulate_latency(&self, factor: u32) {
    tokio::time::sleep(self.latency * factor).await; // Simulate network latency
  }
}

fn demo_columns(table: &str) -> Option<Vec<RawColumn>> {
  let typed = |cols: &[(&str, &str)]| {
    cols
      .iter()
      .map(|(name, ty)| RawColumn::from(ColumnDescriptor::new(*name, *ty)))
      .collect::<Vec<_>>()
  };
  match table {
    "orders" => Some(typed(&[
      ("id", "integer"),
      ("user_id", "integer"),
      ("product_id", "integer"),
      ("quantity", "integer"),
      ("total", "numeric"),
      ("created_at", "timestamp"),
    ])),
    "users" => Some(typed(&[
      ("id", "integer"),
      ("email", "text"),
      ("name", "text"),
      ("country", "text"),
    ])),
    // Some catalogs only report names.
    "products" => Some(
      ["id", "sku", "title", "category", "price"]
        .into_iter()
        .map(RawColumn::from)
        .collect(),
    ),
    _ => None,
  }
}

/// `fact_<t>` for tables holding a numeric measure, `dim_<t>` otherwise.
fn star_schema(mapping: &TableColumns) -> String {
  let mut facts = Vec::new();
  let mut dims = Vec::new();
  for (table, cols) in mapping {
    let is_fact = cols.iter().any(|c| c == "total" || c == "quantity" || c == "price");
    let line = format!("  {}_{} ({})", if is_fact { "fact" } else { "dim" }, table, cols.join(", "));
    if is_fact {
      facts.push(line);
    } else {
      dims.push(line);
    }
  }
  let mut out = String::from("-- star schema\n");
  if !facts.is_empty() {
    out.push_str("facts:\n");
    out.push_str(&facts.join("\n"));
    out.push('\n');
  }
  if !dims.is_empty() {
    out.push_str("dimensions:\n");
    out.push_str(&dims.join("\n"));
    out.push('\n');
  }
  out
}

#[async_trait]
impl CatalogBackend for MockBackend {
  #[instrument(name = "MockBackend::list_tables", skip_all)]
  async fn list_tables(&self) -> anyhow::Result<Vec<TableName>> {
    self.simulate_latency(1).await;
    Ok(
      ["orders", "users", "products", BROKEN_TABLE]
        .into_iter()
        .map(TableName::from)
        .collect(),
    )
  }

  #[instrument(name = "MockBackend::list_columns", skip_all, fields(table = %table))]
  async fn list_columns(&self, table: &TableName) -> anyhow::Result<Vec<RawColumn>> {
    // Vary latency so results arrive out of order.
    let factor = 1 + (table.as_str().len() % 3) as u32;
    self.simulate_latency(factor).await;
    if table.as_str() == BROKEN_TABLE {
      return Err(anyhow!("permission denied for table {}", table));
    }
    demo_columns(table.as_str()).ok_or_else(|| anyhow!("relation \"{}\" does not exist", table))
  }
}

#[async_trait]
impl ModelGenerator for MockBackend {
  #[instrument(name = "MockBackend::generate_model", skip_all, fields(num_tables = mapping.len()))]
  async fn generate_model(&self, mapping: &TableColumns) -> anyhow::Result<String> {
    self.simulate_latency(4).await;
    Ok(star_schema(mapping))
  }
}

#[async_trait]
impl ModelApplier for MockBackend {
  #[instrument(name = "MockBackend::apply_model", skip_all)]
  async fn apply_model(&self, model: &GeneratedModel) -> anyhow::Result<ApplyResponse> {
    self.simulate_latency(2).await;
    info!(tables = model.mapping.len(), "Mock apply SUCCEEDED.");
    Ok(ApplyResponse::ok())
  }
}
