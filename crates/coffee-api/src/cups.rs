//! Handlers for `/cups` and `/cup`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use coffee_core::{
  Records,
  cup::Cup,
  document::CupDocument,
  query::CupCriteria,
  schema::Record,
  store::{DocumentStore, RawRecord},
};
use serde::Deserialize;

use crate::{error::ApiError, params};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Keep cups brewed at or after this instant.
  #[serde(default, deserialize_with = "params::opt_timestamp")]
  pub start:  Option<DateTime<Utc>>,
  #[serde(alias = "coffee_bag_id")]
  pub bag_id: Option<String>,
}

/// `GET /cups[?start=...][&bag_id=...]`
pub async fn list<S>(
  State(records): State<Arc<Records<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CupDocument>>, ApiError>
where
  S: DocumentStore,
{
  let criteria = CupCriteria {
    bag_id: params.bag_id,
    since:  params.start,
  };
  Ok(Json(records.list_cups(&criteria).await?))
}

/// `GET /cups/{id}`
pub async fn get_one<S>(
  State(records): State<Arc<Records<S>>>,
  Path(id): Path<String>,
) -> Result<Json<CupDocument>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(records.get_cup(&id).await?))
}

/// `PUT /cup` — returns 201 + the stored document.
pub async fn create<S>(
  State(records): State<Arc<Records<S>>>,
  Json(body): Json<RawRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let cup = Cup::from_raw(body)?;
  let doc = records.create_cup(&cup).await?;
  Ok((StatusCode::CREATED, Json(doc)))
}
