// pipewright/src/fetch/coordinator.rs

//! Concurrent per-table column discovery with isolated failures.

use crate::model::snapshot::{CatalogSnapshot, ColumnFetchResult};
use crate::model::table::TableName;
use crate::services::catalog::SchemaCatalogClient;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use tracing::{event, instrument, Level};

/// What a fetch round has to do for a set of selected tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
  /// One entry per selected table: reused results carried over, everything
  /// else `Pending`.
  pub snapshot: CatalogSnapshot,
  /// Tables that need a backend request, in table order.
  pub to_fetch: Vec<TableName>,
}

#[derive(Clone)]
pub struct ColumnFetchCoordinator {
  client: SchemaCatalogClient,
}

impl ColumnFetchCoordinator {
  pub fn new(client: SchemaCatalogClient) -> Self {
    Self { client }
  }

  /// Builds the snapshot for `tables` from `previous`.
  ///
  /// Settled entries (`Loaded` or `Failed`) of still-selected tables are
  /// reused. Entries that are `Pending` or absent are scheduled. Entries of
  /// tables no longer selected are dropped.
  pub fn plan(tables: &BTreeSet<TableName>, previous: &CatalogSnapshot) -> FetchPlan {
    let mut snapshot = CatalogSnapshot::new();
    let mut to_fetch = Vec::new();
    for table in tables {
      match previous.get(table) {
        Some(result) if result.is_settled() => snapshot.record(table.clone(), result.clone()),
        _ => {
          snapshot.mark_pending(table.clone());
          to_fetch.push(table.clone());
        }
      }
    }
    FetchPlan { snapshot, to_fetch }
  }

  /// Produces a complete snapshot for `tables`, fetching only what `previous`
  /// cannot supply.
  #[instrument(
    name = "ColumnFetchCoordinator::fetch",
    skip_all,
    fields(num_tables = tables.len(), reused = tracing::field::Empty, fetched = tracing::field::Empty)
  )]
  pub async fn fetch(&self, tables: &BTreeSet<TableName>, previous: &CatalogSnapshot) -> CatalogSnapshot {
    let FetchPlan { mut snapshot, to_fetch } = Self::plan(tables, previous);
    let span = tracing::Span::current();
    span.record("reused", snapshot.len() - to_fetch.len());
    span.record("fetched", to_fetch.len());

    self
      .fetch_each(to_fetch, |table, result| snapshot.record(table, result))
      .await;
    snapshot
  }

  /// Issues one column request per table, all at once, and hands every
  /// outcome to `on_settled` as soon as it arrives.
  ///
  /// A failing or slow table never holds back or cancels the others. Returns
  /// once every request has settled, with the number of requests issued.
  pub async fn fetch_each<F>(&self, tables: Vec<TableName>, mut on_settled: F) -> usize
  where
    F: FnMut(TableName, ColumnFetchResult),
  {
    if tables.is_empty() {
      return 0;
    }
    let issued = tables.len();
    event!(Level::DEBUG, issued, "Fanning out column requests.");

    let mut in_flight: FuturesUnordered<_> = tables
      .into_iter()
      .map(|table| {
        let client = self.client.clone();
        async move {
          let result = match client.list_columns(&table).await {
            Ok(columns) => ColumnFetchResult::Loaded(columns),
            Err(err) => {
              event!(Level::WARN, %table, error = %err, "Column listing failed; table shows no columns.");
              ColumnFetchResult::Failed(err.to_string())
            }
          };
          (table, result)
        }
      })
      .collect();

    while let Some((table, result)) = in_flight.next().await {
      event!(Level::TRACE, %table, loaded = result.is_loaded(), "Column request settled.");
      on_settled(table, result);
    }
    event!(Level::DEBUG, issued, "All column requests settled.");
    issued
  }
}
