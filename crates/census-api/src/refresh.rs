//! Detached statistics recomputation.
//!
//! In [`StatisticsRefresh::Detached`](census_core::store::StatisticsRefresh)
//! mode a citizen write commits on its own and the snapshot is recomputed by
//! a background task. The task's outcome never reaches the request that
//! triggered it; failures are logged instead.

use std::sync::Arc;

use census_core::store::CitizenStore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Spawn a recomputation on the current runtime.
pub fn spawn_recompute<S>(store: Arc<S>) -> JoinHandle<()>
where
  S: CitizenStore + 'static,
{
  tokio::spawn(async move {
    match store.recompute_statistics().await {
      Ok(snapshot) => {
        debug!(last_updated = %snapshot.last_updated, "detached statistics refresh done");
      }
      Err(e) => error!(error = %e, "detached statistics refresh failed"),
    }
  })
}
