//! JSON REST API for the coffee counter.
//!
//! Exposes an axum [`Router`] backed by a [`Records`] façade over any
//! [`DocumentStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Liveness |
//! | `GET`  | `/bags` | Optional `start`, `end`, `brand`, `roast`, `active` |
//! | `GET`  | `/bags/{id}` | 404 if not found |
//! | `PUT`  | `/bag` | Body: bag fields; returns 201 + stored document |
//! | `GET`  | `/cups` | Optional `start`, `bag_id` |
//! | `GET`  | `/cups/{id}` | 404 if not found |
//! | `PUT`  | `/cup` | Body: cup fields; returns 201 + stored document |

pub mod bags;
pub mod cups;
pub mod error;
mod params;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, put},
};
use coffee_core::{Records, store::DocumentStore};
use serde_json::{Value, json};

pub use error::ApiError;

/// Build a fully-materialised API router for `records`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(records: Arc<Records<S>>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    .route("/", get(root))
    // Bags
    .route("/bags", get(bags::list::<S>))
    .route("/bags/{id}", get(bags::get_one::<S>))
    .route("/bag", put(bags::create::<S>))
    // Cups
    .route("/cups", get(cups::list::<S>))
    .route("/cups/{id}", get(cups::get_one::<S>))
    .route("/cup", put(cups::create::<S>))
    .with_state(records)
}

/// `GET /`
async fn root() -> Json<Value> { Json(json!({ "message": "Coffee Counter v2" })) }
