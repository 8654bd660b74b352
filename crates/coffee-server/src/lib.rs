//! Process wiring for the coffee counter server: configuration and the
//! top-level router.

pub mod settings;

use std::sync::Arc;

use axum::Router;
use coffee_core::{Records, store::DocumentStore};
use tower_http::trace::TraceLayer;

pub use settings::{Backend, ConfigError, Settings};

/// The API router with request tracing applied.
pub fn app<S>(records: Arc<Records<S>>) -> Router
where
  S: DocumentStore + 'static,
{
  coffee_api::api_router(records).layer(TraceLayer::new_for_http())
}
