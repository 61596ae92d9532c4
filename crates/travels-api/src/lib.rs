//! JSON HTTP API for the travels dataset.
//!
//! Exposes an axum [`Router`] backed by any
//! [`travels_core::store::DatasetStore`]. Loading the dataset, TLS and
//! transport concerns are the caller's responsibility; see `main.rs` for the
//! server binary.

pub mod config;
pub mod entities;
pub mod error;
pub mod queries;

use std::sync::Arc;

use axum::{Router, routing::get};
use travels_core::store::DatasetStore;

pub use crate::config::ServerConfig;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DatasetStore + 'static,
{
  Router::new()
    // Records
    .route(
      "/users/{id}",
      get(entities::get_user::<S>).post(entities::post_user::<S>),
    )
    .route(
      "/locations/{id}",
      get(entities::get_location::<S>).post(entities::post_location::<S>),
    )
    .route(
      "/visits/{id}",
      get(entities::get_visit::<S>).post(entities::post_visit::<S>),
    )
    // Analytical queries
    .route("/users/{id}/visits", get(queries::user_visits::<S>))
    .route("/locations/{id}/avg", get(queries::location_average::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use serde_json::{Value, json};
  use travels_core::entity::{Gender, Location, User, Visit};
  use travels_store_memory::MemoryStore;
  use tower::ServiceExt as _;

  fn make_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.put(
      User {
        id:         1,
        email:      "ann@example.com".into(),
        first_name: "Ann".into(),
        last_name:  "Lee".into(),
        gender:     Gender::Male,
        birth_date: 315_532_800,
      }
      .into(),
    );
    store.put(
      Location {
        id:       10,
        place:    "Museum".into(),
        country:  "X".into(),
        city:     "Y".into(),
        distance: 5,
      }
      .into(),
    );
    store.put(
      Visit {
        id:         100,
        location:   10,
        user:       1,
        visited_at: 1000,
        mark:       4,
      }
      .into(),
    );
    Arc::new(store)
  }

  async fn oneshot_raw(
    store:  Arc<MemoryStore>,
    method: &str,
    uri:    &str,
    body:   &str,
  ) -> Response {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    api_router(store).oneshot(req).await.unwrap()
  }

  async fn body_string(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
  }

  // ── Lookups ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_user_returns_record() {
    let resp = oneshot_raw(make_store(), "GET", "/users/1", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!({
        "id": 1,
        "email": "ann@example.com",
        "first_name": "Ann",
        "last_name": "Lee",
        "gender": "m",
        "birth_date": 315_532_800
      })
    );
  }

  #[tokio::test]
  async fn get_missing_or_malformed_id_returns_404() {
    let store = make_store();
    for uri in ["/users/2", "/locations/11", "/visits/7", "/users/abc", "/visits/-1"] {
      let resp = oneshot_raw(store.clone(), "GET", uri, "").await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
  }

  // ── User visits ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_visits_lists_joined_rows() {
    let resp = oneshot_raw(make_store(), "GET", "/users/1/visits", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await,
      json!([{ "mark": 4, "visited_at": 1000, "place": "Museum" }])
    );
  }

  #[tokio::test]
  async fn user_visits_filters_and_rejects() {
    let store = make_store();

    let resp =
      oneshot_raw(store.clone(), "GET", "/users/1/visits?toDistance=3", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));

    let resp =
      oneshot_raw(store.clone(), "GET", "/users/1/visits?fromDate=abc", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = oneshot_raw(store, "GET", "/users/2/visits", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Location average ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn location_average_has_five_decimals() {
    let resp = oneshot_raw(make_store(), "GET", "/locations/10/avg", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#"{"avg":4.00000}"#);
  }

  #[tokio::test]
  async fn location_average_without_matches_is_zero() {
    let resp =
      oneshot_raw(make_store(), "GET", "/locations/10/avg?gender=f", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#"{"avg":0.00000}"#);
  }

  #[tokio::test]
  async fn location_average_rejects_and_misses() {
    let store = make_store();
    for uri in [
      "/locations/10/avg?gender=x",
      "/locations/10/avg?fromAge=old",
      "/locations/10/avg?toDate=",
    ] {
      let resp = oneshot_raw(store.clone(), "GET", uri, "").await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    for uri in ["/locations/11/avg", "/locations/11/avg?gender=x"] {
      let resp = oneshot_raw(store.clone(), "GET", uri, "").await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
  }

  // ── Writes ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_new_inserts_record() {
    let store = make_store();
    let body = r#"{"id":101,"location":10,"user":1,"visited_at":2000,"mark":1}"#;
    let resp = oneshot_raw(store.clone(), "POST", "/visits/new", body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "{}");

    let resp = oneshot_raw(store, "GET", "/locations/10/avg", "").await;
    assert_eq!(body_string(resp).await, r#"{"avg":2.50000}"#);
  }

  #[tokio::test]
  async fn post_new_rejects_invalid_records() {
    let store = make_store();
    for (uri, body) in [
      ("/visits/new", r#"{"id":101,"location":10,"user":1,"visited_at":2000,"mark":9}"#),
      ("/visits/new", r#"{"id":101,"location":10,"user":1,"visited_at":2000}"#),
      ("/users/new", r#"{"id":2,"email":null,"first_name":"a","last_name":"b","gender":"m","birth_date":0}"#),
      ("/users/new", r#"{"id":2,"email":"e","first_name":"a","last_name":"b","gender":"q","birth_date":0}"#),
      ("/locations/new", "not json"),
    ] {
      let resp = oneshot_raw(store.clone(), "POST", uri, body).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
    }
    assert_eq!(store.counts().visits, 1);
    assert_eq!(store.counts().users, 1);
  }

  #[tokio::test]
  async fn post_existing_applies_partial_update() {
    let store = make_store();
    let resp = oneshot_raw(
      store.clone(),
      "POST",
      "/users/1",
      r#"{"email":"new@example.com","gender":"f"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user = store.user(1).unwrap();
    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.gender, Gender::Female);
    assert_eq!(user.first_name, "Ann");

    let resp =
      oneshot_raw(store, "GET", "/locations/10/avg?gender=f", "").await;
    assert_eq!(body_string(resp).await, r#"{"avg":4.00000}"#);
  }

  #[tokio::test]
  async fn post_update_rejects_nulls_and_unknown_ids() {
    let store = make_store();

    let resp =
      oneshot_raw(store.clone(), "POST", "/locations/10", r#"{"city":null}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.location(10).unwrap().city, "Y");

    let resp =
      oneshot_raw(store.clone(), "POST", "/locations/99", r#"{"city":"Z"}"#).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(store, "POST", "/visits/100", r#"{"mark":6}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn post_visit_update_moves_listing() {
    let store = make_store();
    store.put(
      User {
        id:         2,
        email:      "bob@example.com".into(),
        first_name: "Bob".into(),
        last_name:  "Ray".into(),
        gender:     Gender::Male,
        birth_date: 0,
      }
      .into(),
    );

    let resp =
      oneshot_raw(store.clone(), "POST", "/visits/100", r#"{"user":2}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_raw(store.clone(), "GET", "/users/1/visits", "").await;
    assert_eq!(body_json(resp).await, json!([]));
    let resp = oneshot_raw(store, "GET", "/users/2/visits", "").await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
  }
}
