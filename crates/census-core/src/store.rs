//! The `CitizenStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `census-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  citizen::{Citizen, CitizenId, CitizenPage, CitizenSummary},
  fields::CitizenFields,
  filter::SearchFilter,
  statistics::StatisticsSnapshot,
};

/// When the statistics snapshot is recomputed after a citizen write.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsRefresh {
  /// Inside the write transaction. A failed recomputation rolls the write
  /// back, and the snapshot is current as soon as the write returns.
  #[default]
  Transactional,
  /// After commit, as a separate step scheduled by the caller. The store only
  /// writes the citizen; the snapshot may briefly lag behind.
  Detached,
}

/// Abstraction over a citizen registry backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CitizenStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a citizen by id. Returns `None` if not found.
  fn get_citizen(
    &self,
    id: CitizenId,
  ) -> impl Future<Output = Result<Option<Citizen>, Self::Error>> + Send + '_;

  /// Up to `limit` summaries ordered by id, skipping `offset`, together with
  /// the size of the whole table. A zero `limit` yields an empty page that
  /// still carries the total.
  fn citizen_slice(
    &self,
    offset: u64,
    limit: u64,
  ) -> impl Future<Output = Result<CitizenPage<CitizenSummary>, Self::Error>>
  + Send
  + '_;

  /// All citizens matching every condition of `filter`, ordered by id.
  ///
  /// Implementations return an empty list for an empty filter without
  /// querying, and stop the query when the returned future is dropped.
  fn search_citizens(
    &self,
    filter: SearchFilter,
  ) -> impl Future<Output = Result<Vec<Citizen>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a citizen from exactly the supplied fields and return the stored
  /// row.
  fn create_citizen(
    &self,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> impl Future<Output = Result<Citizen, Self::Error>> + Send + '_;

  /// Replace the supplied fields of citizen `id` and return the stored row,
  /// or `None` if no such citizen exists. A missing citizen never touches the
  /// statistics snapshot.
  fn update_citizen(
    &self,
    id: CitizenId,
    fields: CitizenFields,
    refresh: StatisticsRefresh,
  ) -> impl Future<Output = Result<Option<Citizen>, Self::Error>> + Send + '_;

  // ── Statistics ────────────────────────────────────────────────────────

  /// Recompute the snapshot over all citizens and upsert it atomically.
  fn recompute_statistics(
    &self,
  ) -> impl Future<Output = Result<StatisticsSnapshot, Self::Error>> + Send + '_;

  /// The current snapshot, or `None` if it has never been computed.
  fn latest_statistics(
    &self,
  ) -> impl Future<Output = Result<Option<StatisticsSnapshot>, Self::Error>>
  + Send
  + '_;
}
