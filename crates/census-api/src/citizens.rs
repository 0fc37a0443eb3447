//! Handlers for `/citizens` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/citizens/{id}` | 404 if not found |
//! | `GET`  | `/citizens/slice/{start}/{end}` | Summaries in id order + table size |
//! | `POST` | `/citizens` | Body: field map; returns 201 + stored citizen |
//! | `PUT`  | `/citizens/{id}` | Body: field map; 404 if not found |
//!
//! Writes refresh the statistics snapshot according to
//! [`ApiConfig::statistics_refresh`](crate::ApiConfig).

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  citizen::{Citizen, CitizenId, CitizenPage, CitizenSummary},
  fields::CitizenFields,
  store::{CitizenStore, StatisticsRefresh},
};
use serde_json::{Map, Value};

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, PathParams},
  refresh::spawn_recompute,
};

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /citizens/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathParams(id): PathParams<CitizenId>,
) -> Result<Json<Citizen>, ApiError>
where
  S: CitizenStore + 'static,
{
  let citizen = state
    .store
    .get_citizen(id)
    .await
    .map_err(ApiError::store("fetching the citizen"))?
    .ok_or_else(|| ApiError::NotFound("citizen not found".into()))?;
  Ok(Json(citizen))
}

// ─── Slice ────────────────────────────────────────────────────────────────────

/// `GET /citizens/slice/{start}/{end}`
///
/// Offset `start`, limit `end - start`. An inverted or zero-width range
/// yields an empty page that still carries the total count.
pub async fn slice<S>(
  State(state): State<AppState<S>>,
  PathParams((start, end)): PathParams<(u64, u64)>,
) -> Result<Json<CitizenPage<CitizenSummary>>, ApiError>
where
  S: CitizenStore + 'static,
{
  let page = state
    .store
    .citizen_slice(start, end.saturating_sub(start))
    .await
    .map_err(ApiError::store("fetching citizens slice"))?;
  Ok(Json(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /citizens` — returns 201 + the stored [`Citizen`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CitizenStore + 'static,
{
  let fields = CitizenFields::from_json(body)?;
  let refresh = state.config.statistics_refresh;

  let citizen = state
    .store
    .create_citizen(fields, refresh)
    .await
    .map_err(ApiError::store("creating the citizen"))?;

  after_write(&state, refresh);
  Ok((StatusCode::CREATED, Json(citizen)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /citizens/{id}` — replaces exactly the supplied fields.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  PathParams(id): PathParams<CitizenId>,
  JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Citizen>, ApiError>
where
  S: CitizenStore + 'static,
{
  let fields = CitizenFields::from_json(body)?;
  let refresh = state.config.statistics_refresh;

  let citizen = state
    .store
    .update_citizen(id, fields, refresh)
    .await
    .map_err(ApiError::store("updating the citizen"))?
    .ok_or_else(|| ApiError::NotFound("citizen not found".into()))?;

  after_write(&state, refresh);
  Ok(Json(citizen))
}

/// Detached mode hands the recomputation to a background task once the
/// write has committed.
fn after_write<S>(state: &AppState<S>, refresh: StatisticsRefresh)
where
  S: CitizenStore + 'static,
{
  if refresh == StatisticsRefresh::Detached {
    spawn_recompute(state.store.clone());
  }
}
