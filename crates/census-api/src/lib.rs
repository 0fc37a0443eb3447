//! JSON REST API for Census.
//!
//! Exposes an axum [`Router`] backed by any [`census_core::store::CitizenStore`].
//! CORS, tracing, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", census_api::api_router(store.clone(), ApiConfig::default()))
//! ```

pub mod citizens;
pub mod error;
pub mod extract;
pub mod refresh;
pub mod search;
pub mod statistics;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use census_core::store::{CitizenStore, StatisticsRefresh};

pub use error::ApiError;

/// Deadline applied to searches unless configured otherwise.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

// ─── Configuration ────────────────────────────────────────────────────────────

/// Behaviour knobs for the API handlers.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// A search still running after this long is abandoned with a 408.
  pub search_timeout:     Duration,
  /// How citizen writes refresh the statistics snapshot.
  pub statistics_refresh: StatisticsRefresh,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      search_timeout:     DEFAULT_SEARCH_TIMEOUT,
      statistics_refresh: StatisticsRefresh::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

// Manual impl: cloning the `Arc`s must not require `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, config: ApiConfig) -> Router<()>
where
  S: CitizenStore + 'static,
{
  let state = AppState { store, config: Arc::new(config) };

  Router::new()
    // Citizens
    .route("/citizens", post(citizens::create::<S>))
    .route("/citizens/search", post(search::handler::<S>))
    .route("/citizens/slice/{start}/{end}", get(citizens::slice::<S>))
    .route(
      "/citizens/{id}",
      get(citizens::get_one::<S>).put(citizens::update::<S>),
    )
    // Statistics
    .route("/statistics", get(statistics::latest::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
