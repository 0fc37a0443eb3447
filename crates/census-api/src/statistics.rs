//! Handler for `GET /statistics`.

use axum::{Json, extract::State};
use census_core::{statistics::StatisticsSnapshot, store::CitizenStore};

use crate::{AppState, error::ApiError};

/// `GET /statistics` — the current snapshot, 404 if none was computed yet.
pub async fn latest<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<StatisticsSnapshot>, ApiError>
where
  S: CitizenStore + 'static,
{
  let snapshot = state
    .store
    .latest_statistics()
    .await
    .map_err(ApiError::store("fetching statistics"))?
    .ok_or_else(|| ApiError::NotFound("statistics not found".into()))?;
  Ok(Json(snapshot))
}
