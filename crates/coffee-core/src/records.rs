//! [`Records`] — the record access façade.
//!
//! Composes the query builder and the schema layer around an injected
//! [`DocumentStore`]. Every operation issues exactly one store call and
//! passes store failures through untouched (not-found becomes
//! [`Error::NotFound`], everything else [`Error::Store`]).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
  Error, Result,
  bag::Bag,
  cup::Cup,
  document::{BagDocument, CupDocument, Document},
  query::{BagCriteria, Criteria, CupCriteria},
  schema::Record,
  store::{DocumentStore, StoreError},
};

/// Collection identifiers, one per record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
  pub bags: String,
  pub cups: String,
}

/// Get, list and create operations for bags and cups.
///
/// Built once at startup from a store handle and the configured collections,
/// then shared read-only between requests.
pub struct Records<S> {
  store:       Arc<S>,
  collections: Collections,
}

impl<S> Clone for Records<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      collections: self.collections.clone(),
    }
  }
}

impl<S: DocumentStore> Records<S> {
  pub fn new(store: Arc<S>, collections: Collections) -> Self {
    Self { store, collections }
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Bags ──────────────────────────────────────────────────────────────

  pub async fn get_bag(&self, id: &str) -> Result<BagDocument> {
    self.get(&self.collections.bags, id).await
  }

  pub async fn list_bags(&self, criteria: &BagCriteria) -> Result<Vec<BagDocument>> {
    self.list(&self.collections.bags, criteria).await
  }

  /// Validate `bag`, store it, and return the stored document.
  pub async fn create_bag(&self, bag: &Bag) -> Result<BagDocument> {
    self.create(&self.collections.bags, bag).await
  }

  // ── Cups ──────────────────────────────────────────────────────────────

  pub async fn get_cup(&self, id: &str) -> Result<CupDocument> {
    self.get(&self.collections.cups, id).await
  }

  pub async fn list_cups(&self, criteria: &CupCriteria) -> Result<Vec<CupDocument>> {
    self.list(&self.collections.cups, criteria).await
  }

  pub async fn create_cup(&self, cup: &Cup) -> Result<CupDocument> {
    self.create(&self.collections.cups, cup).await
  }

  // ── Shared ────────────────────────────────────────────────────────────

  async fn get<T: Record>(&self, collection: &str, id: &str) -> Result<Document<T>> {
    debug!(collection, id, "fetching document");
    let raw = self
      .store
      .get(collection, id)
      .await
      .map_err(|e| store_failure(collection, e))?;
    Ok(Document::from_raw(raw)?)
  }

  /// A record that fails to decode fails the whole listing.
  async fn list<C>(&self, collection: &str, criteria: &C) -> Result<Vec<Document<C::Record>>>
  where
    C: Criteria,
    C::Record: Record,
  {
    let filters = criteria.filters();
    debug!(
      collection,
      filters = ?filters.iter().map(ToString::to_string).collect::<Vec<_>>(),
      "listing documents"
    );

    let raws = self
      .store
      .list(collection, &filters)
      .await
      .map_err(|e| store_failure(collection, e))?;

    let mut docs = raws
      .into_iter()
      .map(Document::<C::Record>::from_raw)
      .collect::<Result<Vec<_>, _>>()?;

    let fetched = docs.len();
    criteria.refine(&mut docs);
    debug!(collection, fetched, kept = docs.len(), "refined listing");
    Ok(docs)
  }

  async fn create<T: Record>(&self, collection: &str, record: &T) -> Result<Document<T>> {
    record.validate()?;
    let data = record.to_raw()?;
    let raw = self
      .store
      .create(collection, data)
      .await
      .map_err(|e| store_failure(collection, e))?;
    let doc = Document::from_raw(raw)?;
    debug!(collection, id = doc.id(), "created document");
    Ok(doc)
  }
}

fn store_failure(collection: &str, e: StoreError) -> Error {
  match &e {
    StoreError::NotFound { .. } => debug!(collection, "{e}"),
    _ => warn!(collection, "{e}"),
  }
  Error::from(e)
}
