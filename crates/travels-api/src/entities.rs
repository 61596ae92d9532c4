//! Handlers for single-record endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/{kind}/:id` | The record; 404 if absent or `id` is not an integer |
//! | `POST` | `/{kind}/new` | Body: full record; inserts or replaces by `id` |
//! | `POST` | `/{kind}/:id` | Body: any subset of the non-id fields; 404 if absent |
//!
//! `{kind}` is one of `users`, `locations`, `visits`. Successful writes
//! answer `{}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use travels_core::{
  entity::{
    Entity, EntityKind, EntityPatch, Location, LocationPatch, User, UserPatch,
    Visit, VisitPatch,
  },
  store::DatasetStore,
};

use crate::error::ApiError;

/// Path segment that turns a `POST` into an insert.
pub const NEW: &str = "new";

/// Parse a path id. Anything that is not a valid id cannot name a record.
pub(crate) fn parse_id(kind: EntityKind, raw: &str) -> Result<u32, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::NotFound(format!("{kind} {raw:?} not found")))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

fn fetch<S: DatasetStore>(
  store: &S,
  kind: EntityKind,
  raw_id: &str,
) -> Result<Json<Entity>, ApiError> {
  let id = parse_id(kind, raw_id)?;
  Ok(Json(store.get(kind, id)?))
}

/// `GET /users/:id`
pub async fn get_user<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Entity>, ApiError> {
  fetch(&*store, EntityKind::User, &id)
}

/// `GET /locations/:id`
pub async fn get_location<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Entity>, ApiError> {
  fetch(&*store, EntityKind::Location, &id)
}

/// `GET /visits/:id`
pub async fn get_visit<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Entity>, ApiError> {
  fetch(&*store, EntityKind::Visit, &id)
}

// ─── Insert / update ──────────────────────────────────────────────────────────

/// Parse a JSON object body. `null` is never a valid field value.
fn object_body(body: &[u8]) -> Result<Value, ApiError> {
  let value: Value = serde_json::from_slice(body)
    .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;
  let fields = value
    .as_object()
    .ok_or_else(|| ApiError::BadRequest("body must be a JSON object".into()))?;
  if let Some((name, _)) = fields.iter().find(|(_, v)| v.is_null()) {
    return Err(ApiError::BadRequest(format!("field {name:?} is null")));
  }
  Ok(value)
}

fn from_body<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value)
    .map_err(|e| ApiError::BadRequest(format!("invalid record: {e}")))
}

fn decode_entity(kind: EntityKind, value: Value) -> Result<Entity, ApiError> {
  Ok(match kind {
    EntityKind::User => from_body::<User>(value)?.into(),
    EntityKind::Location => from_body::<Location>(value)?.into(),
    EntityKind::Visit => from_body::<Visit>(value)?.into(),
  })
}

fn decode_patch(kind: EntityKind, value: Value) -> Result<EntityPatch, ApiError> {
  Ok(match kind {
    EntityKind::User => EntityPatch::User(from_body::<UserPatch>(value)?),
    EntityKind::Location => {
      EntityPatch::Location(from_body::<LocationPatch>(value)?)
    }
    EntityKind::Visit => EntityPatch::Visit(from_body::<VisitPatch>(value)?),
  })
}

fn write<S: DatasetStore>(
  store: &S,
  kind: EntityKind,
  raw_id: &str,
  body: &[u8],
) -> Result<Json<Value>, ApiError> {
  if raw_id == NEW {
    let entity = decode_entity(kind, object_body(body)?)?;
    entity.validate()?;
    store.put(entity);
  } else {
    let id = parse_id(kind, raw_id)?;
    // An unknown id is a 404 even when the body is malformed.
    store.get(kind, id)?;
    let patch = decode_patch(kind, object_body(body)?)?;
    patch.validate()?;
    store.update(id, patch)?;
  }
  Ok(Json(json!({})))
}

/// `POST /users/new` or `POST /users/:id`
pub async fn post_user<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Bytes,
) -> Result<Json<Value>, ApiError> {
  write(&*store, EntityKind::User, &id, &body)
}

/// `POST /locations/new` or `POST /locations/:id`
pub async fn post_location<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Bytes,
) -> Result<Json<Value>, ApiError> {
  write(&*store, EntityKind::Location, &id, &body)
}

/// `POST /visits/new` or `POST /visits/:id`
pub async fn post_visit<S: DatasetStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Bytes,
) -> Result<Json<Value>, ApiError> {
  write(&*store, EntityKind::Visit, &id, &body)
}
