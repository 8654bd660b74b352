//! Handlers for `/bags` and `/bag`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use coffee_core::{
  Records,
  bag::{Bag, Roast},
  document::BagDocument,
  query::{BagCriteria, DateWindow},
  schema::Record,
  store::{DocumentStore, RawRecord},
};
use serde::Deserialize;

use crate::{error::ApiError, params};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Drop bags opened before this date.
  pub start:  Option<NaiveDate>,
  /// Drop bags finished after this date.
  pub end:    Option<NaiveDate>,
  pub brand:  Option<String>,
  pub roast:  Option<Roast>,
  #[serde(default, deserialize_with = "params::opt_flag")]
  pub active: Option<bool>,
}

impl From<ListParams> for BagCriteria {
  fn from(p: ListParams) -> Self {
    BagCriteria {
      brand:  p.brand,
      active: p.active,
      roast:  p.roast,
      window: DateWindow { start: p.start, end: p.end },
    }
  }
}

/// `GET /bags[?start=...][&end=...][&brand=...][&roast=...][&active=...]`
pub async fn list<S>(
  State(records): State<Arc<Records<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<BagDocument>>, ApiError>
where
  S: DocumentStore,
{
  let bags = records.list_bags(&BagCriteria::from(params)).await?;
  Ok(Json(bags))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /bags/{id}`
pub async fn get_one<S>(
  State(records): State<Arc<Records<S>>>,
  Path(id): Path<String>,
) -> Result<Json<BagDocument>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(records.get_bag(&id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `PUT /bag` — body is a bag object; returns 201 + the stored document.
///
/// The body goes through the same schema layer as store data, so blank
/// `start_date`/`end_date`/`roast` mean "absent" here too.
pub async fn create<S>(
  State(records): State<Arc<Records<S>>>,
  Json(body): Json<RawRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let bag = Bag::from_raw(body)?;
  let doc = records.create_bag(&bag).await?;
  Ok((StatusCode::CREATED, Json(doc)))
}
