//! Handlers for the two analytical endpoints.
//!
//! Query parameters are handed to the filter compiler as raw strings; a
//! malformed value rejects the request with 400 before the store is read.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use travels_core::{
  entity::EntityKind,
  filter::FilterParams,
  store::{DatasetStore, VisitSummary},
};

use crate::{entities::parse_id, error::ApiError};

/// `GET /users/:id/visits[?fromDate=..][&toDate=..][&country=..][&toDistance=..]`
pub async fn user_visits<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(filters): Query<FilterParams>,
) -> Result<Json<Vec<VisitSummary>>, ApiError> {
  let id = parse_id(EntityKind::User, &id)?;
  Ok(Json(store.visits_for_user(id, &filters)?))
}

/// `GET /locations/:id/avg[?fromDate=..][&toDate=..][&fromAge=..][&toAge=..][&gender=..]`
///
/// Answers `{"avg": <mean>}` with exactly five decimals.
pub async fn location_average<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Query(filters): Query<FilterParams>,
) -> Result<Response, ApiError> {
  let id = parse_id(EntityKind::Location, &id)?;
  let avg = store.average_mark_for_location(id, &filters)?;
  Ok(
    (
      [(header::CONTENT_TYPE, "application/json")],
      format!("{{\"avg\":{avg}}}"),
    )
      .into_response(),
  )
}
