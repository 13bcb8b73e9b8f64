// demos/pipewright_console/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
  Http,
  Mock,
}

/// Database the HTTP backend is asked to introspect. Sent with the table listing.
#[derive(Debug, Clone, Serialize)]
pub struct DbConnection {
  pub host: String,
  pub port: u16,
  pub user: String,
  pub password: String,
  #[serde(rename = "database")]
  pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub backend: BackendKind,
  pub api_url: Option<String>,
  pub http_timeout: Duration,
  pub db: Option<DbConnection>,

  // What the scripted run selects. `None` means "everything offered".
  pub tables: Option<Vec<String>>,
  pub columns: Option<BTreeMap<String, Vec<String>>>,
  pub apply: bool,

  pub mock_latency: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let backend = match get_env("PIPEWRIGHT_BACKEND").as_deref().map(str::trim) {
      None | Some("mock") => BackendKind::Mock,
      Some("http") => BackendKind::Http,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid PIPEWRIGHT_BACKEND '{}': expected 'http' or 'mock'",
          other
        )))
      }
    };

    let api_url = get_env("PIPEWRIGHT_API_URL").map(|u| u.trim().trim_end_matches('/').to_string());
    if backend == BackendKind::Http && api_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'PIPEWRIGHT_API_URL' (required for the http backend)".to_string(),
      ));
    }

    let http_timeout = Duration::from_secs(parse_or(get_env("PIPEWRIGHT_HTTP_TIMEOUT_SECS"), "PIPEWRIGHT_HTTP_TIMEOUT_SECS", 30)?);
    let mock_latency = Duration::from_millis(parse_or(get_env("PIPEWRIGHT_MOCK_LATENCY_MS"), "PIPEWRIGHT_MOCK_LATENCY_MS", 25)?);

    let db = match get_env("PIPEWRIGHT_DB_HOST") {
      Some(host) => Some(DbConnection {
        host,
        port: parse_or(get_env("PIPEWRIGHT_DB_PORT"), "PIPEWRIGHT_DB_PORT", 5432)?,
        user: get_env("PIPEWRIGHT_DB_USER").unwrap_or_default(),
        password: get_env("PIPEWRIGHT_DB_PASSWORD").unwrap_or_default(),
        name: get_env("PIPEWRIGHT_DB_NAME").unwrap_or_default(),
      }),
      None => None,
    };

    let tables = get_env("PIPEWRIGHT_TABLES").map(|raw| parse_table_list(&raw));
    let columns = get_env("PIPEWRIGHT_COLUMNS").map(|raw| parse_column_map(&raw)).transpose()?;
    let apply = parse_or(get_env("PIPEWRIGHT_APPLY"), "PIPEWRIGHT_APPLY", false)?;

    // Never log the password.
    tracing::info!(
      backend = ?backend,
      api_url = api_url.as_deref().unwrap_or("-"),
      db_host = db.as_ref().map(|d| d.host.as_str()).unwrap_or("-"),
      "Console configuration loaded."
    );

    Ok(Self {
      backend,
      api_url,
      http_timeout,
      db,
      tables,
      columns,
      apply,
      mock_latency,
    })
  }
}

/// Whether `PIPEWRIGHT_LOG_JSON` asks for JSON logs. Read before the
/// subscriber exists, so invalid values fall back to plain output.
pub fn log_json_enabled() -> bool {
  dotenv().ok();
  env::var("PIPEWRIGHT_LOG_JSON").is_ok_and(|v| v.trim().parse::<bool>().unwrap_or(false))
}

fn parse_or<T>(raw: Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, value, e))),
  }
}

/// `orders, users` -> `["orders", "users"]`.
pub fn parse_table_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_string)
    .collect()
}

/// `orders:id|total;users:email` -> `{orders: [id, total], users: [email]}`.
pub fn parse_column_map(raw: &str) -> Result<BTreeMap<String, Vec<String>>> {
  let mut map = BTreeMap::new();
  for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
    let Some((table, cols)) = entry.split_once(':') else {
      return Err(AppError::Config(format!(
        "Invalid PIPEWRIGHT_COLUMNS entry '{}': expected 'table:col|col'",
        entry
      )));
    };
    let cols: Vec<String> = cols
      .split('|')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(str::to_string)
      .collect();
    map.insert(table.trim().to_string(), cols);
  }
  Ok(map)
}
