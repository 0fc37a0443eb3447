//! Handler for `POST /citizens/search`.
//!
//! The body maps column names to fragments, e.g.
//! `{"city": "Spring", "gender": "female"}`. A citizen matches when every
//! fragment occurs, case-insensitively, in its column.

use axum::{Json, extract::State};
use census_core::{
  citizen::{Citizen, CitizenPage},
  filter::SearchFilter,
  store::CitizenStore,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{AppState, error::ApiError, extract::JsonBody};

/// `POST /citizens/search`
///
/// A body with no usable filter returns an empty page without querying the
/// store. A query outliving [`ApiConfig::search_timeout`](crate::ApiConfig)
/// is dropped and answered with 408; stores cancel the query on drop.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<CitizenPage<Citizen>>, ApiError>
where
  S: CitizenStore + 'static,
{
  let filter = SearchFilter::from_json(body)?;
  if filter.is_empty() {
    debug!("search without usable filters; returning no citizens");
    return Ok(Json(CitizenPage::empty()));
  }

  let deadline = state.config.search_timeout;
  let citizens = tokio::time::timeout(deadline, state.store.search_citizens(filter))
    .await
    .map_err(|_| ApiError::Timeout(deadline))?
    .map_err(ApiError::store("searching citizens"))?;

  info!(matches = citizens.len(), "search completed");
  Ok(Json(CitizenPage::counted(citizens)))
}
