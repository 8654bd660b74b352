//! Async HTTP client wrapping the Appwrite database API.

use std::{future::Future, time::Duration};

use coffee_core::{
  document::Permissions,
  query::Filter,
  store::{DocumentStore, RawRecord, StoreError},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

/// Failure to build an [`AppwriteStore`].
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid API endpoint {endpoint:?}: {reason}")]
  Endpoint { endpoint: String, reason: String },

  #[error("failed to build HTTP client: {0}")]
  Http(#[from] reqwest::Error),
}

/// Connection settings for the Appwrite endpoint.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
  /// API root, e.g. `https://appwrite.example.com/v1`.
  pub api_endpoint: String,
  pub project_id:   String,
  pub api_key:      String,
  /// Read/write principals given to created documents.
  pub permissions:  Permissions,
  pub timeout:      Duration,
}

/// [`DocumentStore`] backed by a hosted Appwrite project.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct AppwriteStore {
  client: Client,
  /// `api_endpoint`, parsed once; document paths are appended segment-wise.
  base:   Url,
  config: AppwriteConfig,
}

// ─── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DocumentList {
  documents: Vec<RawRecord>,
}

#[derive(Serialize)]
struct CreateBody<'a> {
  data:  &'a RawRecord,
  #[serde(skip_serializing_if = "Option::is_none")]
  read:  Option<&'a [String]>,
  #[serde(skip_serializing_if = "Option::is_none")]
  write: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

fn non_empty(v: &[String]) -> Option<&[String]> { (!v.is_empty()).then_some(v) }

// ─── Client ──────────────────────────────────────────────────────────────────

impl AppwriteStore {
  pub fn new(config: AppwriteConfig) -> Result<Self, ClientError> {
    let invalid = |reason: String| ClientError::Endpoint {
      endpoint: config.api_endpoint.clone(),
      reason,
    };
    let base = Url::parse(&config.api_endpoint).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(invalid("not a hierarchical URL".into()));
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base, config })
  }

  /// `{endpoint}/database/collections/{collection}/documents[/{id}]`.
  ///
  /// Each part is pushed as one percent-encoded path segment, so `/`, `?`
  /// and `#` inside an id or collection never leave that segment.
  fn documents_url(&self, collection: &str, id: Option<&str>) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path
        .pop_if_empty()
        .extend(["database", "collections", collection, "documents"]);
      if let Some(id) = id {
        path.push(id);
      }
    }
    url
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    req
      .header("X-Appwrite-Project", &self.config.project_id)
      .header("X-Appwrite-Key", &self.config.api_key)
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, StoreError> {
    self
      .auth(req)
      .send()
      .await
      .map_err(|e| StoreError::Unavailable(format!("{what} failed: {e}")))
  }
}

/// Map a response onto the store's error kinds, or decode its body.
///
/// A 404 is [`StoreError::NotFound`] only when a single document was asked
/// for; a missing collection on list/create is a rejection.
async fn decode<T: DeserializeOwned>(
  resp: Response,
  collection: &str,
  id: Option<&str>,
) -> Result<T, StoreError> {
  let status = resp.status();
  if status.is_success() {
    return resp
      .json()
      .await
      .map_err(|e| StoreError::Malformed(e.to_string()));
  }

  let body = resp.text().await.unwrap_or_default();
  let message = serde_json::from_str::<ErrorBody>(&body)
    .map(|b| b.message)
    .unwrap_or(body);

  match (status, id) {
    (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound {
      collection: collection.to_owned(),
      id:         id.to_owned(),
    }),
    (s, _) if s.is_server_error() => Err(StoreError::Unavailable(format!("{s}: {message}"))),
    (s, _) => Err(StoreError::Rejected { status: s.as_u16(), message }),
  }
}

impl DocumentStore for AppwriteStore {
  /// `GET /database/collections/{collection}/documents?filters[]=...`
  fn list<'a>(
    &'a self,
    collection: &'a str,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send + 'a {
    async move {
      let query: Vec<(&str, String)> = filters
        .iter()
        .map(|f| ("filters[]", f.to_string()))
        .collect();
      debug!(collection, ?query, "appwrite list");

      let req = self.client.get(self.documents_url(collection, None)).query(&query);
      let resp = self.send(req, "list documents").await?;
      let list: DocumentList = decode(resp, collection, None).await?;
      Ok(list.documents)
    }
  }

  /// `GET /database/collections/{collection}/documents/{id}`
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      debug!(collection, id, "appwrite get");
      let url = self.documents_url(collection, Some(id));
      let resp = self.send(self.client.get(url), "get document").await?;
      decode(resp, collection, Some(id)).await
    }
  }

  /// `POST /database/collections/{collection}/documents`
  fn create<'a>(
    &'a self,
    collection: &'a str,
    data: RawRecord,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      debug!(collection, "appwrite create");
      let body = CreateBody {
        data:  &data,
        read:  non_empty(&self.config.permissions.read),
        write: non_empty(&self.config.permissions.write),
      };
      let req = self.client.post(self.documents_url(collection, None)).json(&body);
      let resp = self.send(req, "create document").await?;
      decode(resp, collection, None).await
    }
  }
}
