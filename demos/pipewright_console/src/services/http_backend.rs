// demos/pipewright_console/src/services/http_backend.rs

use crate::config::DbConnection;
use crate::errors::Result as AppResult;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use pipewright::{
  ApplyResponse, CatalogBackend, GeneratedModel, ModelApplier, ModelGenerator, RawColumn, TableColumns, TableName,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// Catalog, generator and applier backed by the pipeline-definition REST API.
pub struct HttpBackend {
  client: reqwest::Client,
  api_url: String,
  connection: Option<DbConnection>,
}

#[derive(Deserialize)]
struct TablesBody {
  tables: Vec<TableName>,
}

#[derive(Deserialize)]
struct ColumnsBody {
  columns: Vec<RawColumn>,
}

#[derive(Deserialize)]
struct ModelBody {
  #[serde(default)]
  model: Option<String>,
}

#[derive(Serialize)]
struct ApplyBody<'a> {
  tables: &'a TableColumns,
  model: &'a str,
}

impl HttpBackend {
  pub fn new(api_url: &str, timeout: Duration, connection: Option<DbConnection>) -> AppResult<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      api_url: api_url.trim_end_matches('/').to_string(),
      connection,
    })
  }

  fn endpoint(&self, path: &str) -> String {
    format!("{}/{}/", self.api_url, path)
  }

  /// POSTs `body` and decodes a 2xx answer. Other statuses become errors
  /// carrying the body's `detail` when the API sent one.
  async fn post<B, R>(&self, path: &str, body: &B) -> anyhow::Result<R>
  where
    B: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
  {
    let url = self.endpoint(path);
    debug!(%url, "POST");
    let resp = self.client.post(&url).json(body).send().await?;
    let status = resp.status();
    if !status.is_success() {
      let detail = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string));
      return Err(match detail {
        Some(detail) => anyhow!("{}", detail),
        None => anyhow!("HTTP {} from {}", status, url),
      });
    }
    resp
      .json::<R>()
      .await
      .with_context(|| format!("Unexpected response body from {}", url))
  }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
  #[instrument(name = "HttpBackend::list_tables", skip_all)]
  async fn list_tables(&self) -> anyhow::Result<Vec<TableName>> {
    let body = match &self.connection {
      Some(conn) => serde_json::to_value(conn)?,
      None => json!({}),
    };
    let resp: TablesBody = self.post("connect-db", &body).await?;
    Ok(resp.tables)
  }

  #[instrument(name = "HttpBackend::list_columns", skip_all, fields(table = %table))]
  async fn list_columns(&self, table: &TableName) -> anyhow::Result<Vec<RawColumn>> {
    let resp: ColumnsBody = self.post("preview-table", &json!({ "table_name": table })).await?;
    Ok(resp.columns)
  }
}

#[async_trait]
impl ModelGenerator for HttpBackend {
  #[instrument(name = "HttpBackend::generate_model", skip_all, fields(num_tables = mapping.len()))]
  async fn generate_model(&self, mapping: &TableColumns) -> anyhow::Result<String> {
    let resp: ModelBody = self.post("generate-data-model", &json!({ "tables": mapping })).await?;
    Ok(resp.model.unwrap_or_default())
  }
}

#[async_trait]
impl ModelApplier for HttpBackend {
  #[instrument(name = "HttpBackend::apply_model", skip_all)]
  async fn apply_model(&self, model: &GeneratedModel) -> anyhow::Result<ApplyResponse> {
    let body = ApplyBody {
      tables: &model.mapping,
      model: &model.text,
    };
    self.post("apply-data-model", &body).await
  }
}
