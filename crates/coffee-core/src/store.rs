//! The `DocumentStore` trait and the raw wire types it trades in.
//!
//! The trait is implemented by backends (e.g. `coffee-store-appwrite`). The
//! [`Records`](crate::Records) façade depends on this abstraction only, so a
//! substitute store can be injected in tests.

use std::future::Future;

use thiserror::Error;

use crate::query::Filter;

/// A record exactly as the remote store returns it: a JSON object whose
/// metadata keys may still carry the store's `$` sigil.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failures reported by a [`DocumentStore`]. Each kind is distinct so callers
/// can tell a missing document from an unreachable backend.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{collection} document not found: {id}")]
  NotFound { collection: String, id: String },

  /// The store could not be reached, or failed on its side (5xx).
  #[error("backend unavailable: {0}")]
  Unavailable(String),

  /// The store refused the request (4xx other than 404).
  #[error("backend rejected request ({status}): {message}")]
  Rejected { status: u16, message: String },

  /// The store answered, but not with the JSON shape we expect.
  #[error("malformed backend response: {0}")]
  Malformed(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a hosted document database.
///
/// Every method issues exactly one remote call. Implementations do not retry
/// and do not cache.
pub trait DocumentStore: Send + Sync {
  /// List the documents of `collection` matching every filter (logical AND).
  /// Order is whatever the store returns.
  fn list<'a>(
    &'a self,
    collection: &'a str,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send + 'a;

  /// Fetch one document by identity.
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a;

  /// Persist `data` as a new document and return it with the identity and
  /// permissions the store assigned.
  fn create<'a>(
    &'a self,
    collection: &'a str,
    data: RawRecord,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a;
}
