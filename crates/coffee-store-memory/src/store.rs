//! [`MemoryStore`] — an in-memory implementation of [`DocumentStore`].

use std::{collections::HashMap, future::Future, sync::Arc};

use coffee_core::{
  document::Permissions,
  query::Filter,
  store::{DocumentStore, RawRecord, StoreError},
};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

// ─── Store ───────────────────────────────────────────────────────────────────

/// Documents grouped by collection, in insertion order.
///
/// Cloning is cheap — clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
  collections: Arc<RwLock<HashMap<String, Vec<RawRecord>>>>,
  permissions: Permissions,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Permissions stamped onto every created document.
  pub fn with_permissions(permissions: Permissions) -> Self {
    Self { permissions, ..Self::default() }
  }

  /// Number of documents currently held in `collection`.
  pub async fn len(&self, collection: &str) -> usize {
    self
      .collections
      .read()
      .await
      .get(collection)
      .map_or(0, Vec::len)
  }
}

/// Equality as the hosted store applies it: booleans match `1`/`0`, numbers
/// their textual form.
fn matches(stored: Option<&Value>, expected: &str) -> bool {
  match stored {
    Some(Value::String(s)) => s == expected,
    Some(Value::Bool(b)) => {
      let flag = if *b { "1" } else { "0" };
      expected == flag || expected == b.to_string()
    }
    Some(Value::Number(n)) => {
      n.to_string() == expected
        || matches!(
          (n.as_f64(), expected.parse::<f64>()),
          (Some(a), Ok(b)) if a == b
        )
    }
    _ => false,
  }
}

impl DocumentStore for MemoryStore {
  fn list<'a>(
    &'a self,
    collection: &'a str,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send + 'a {
    async move {
      let guard = self.collections.read().await;
      let found: Vec<RawRecord> = guard
        .get(collection)
        .into_iter()
        .flatten()
        .filter(|doc| {
          filters
            .iter()
            .all(|f| matches(doc.get(&f.field), &f.value))
        })
        .cloned()
        .collect();
      debug!(collection, matched = found.len(), "memory list");
      Ok(found)
    }
  }

  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      self
        .collections
        .read()
        .await
        .get(collection)
        .and_then(|docs| {
          docs
            .iter()
            .find(|d| d.get("$id").and_then(Value::as_str) == Some(id))
        })
        .cloned()
        .ok_or_else(|| StoreError::NotFound {
          collection: collection.to_owned(),
          id:         id.to_owned(),
        })
    }
  }

  fn create<'a>(
    &'a self,
    collection: &'a str,
    data: RawRecord,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      let mut doc = RawRecord::new();
      doc.insert("$id".into(), json!(Uuid::new_v4().simple().to_string()));
      doc.insert("$collection".into(), json!(collection));
      doc.insert(
        "$permissions".into(),
        json!({
          "read":  self.permissions.read,
          "write": self.permissions.write,
        }),
      );
      // Caller data never overrides the assigned metadata.
      for (key, value) in data {
        if !key.starts_with('$') {
          doc.insert(key, value);
        }
      }

      self
        .collections
        .write()
        .await
        .entry(collection.to_owned())
        .or_default()
        .push(doc.clone());
      debug!(collection, "memory create");
      Ok(doc)
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::matches;

  #[test]
  fn equality_rules() {
    assert!(matches(Some(&json!("Acme")), "Acme"));
    assert!(!matches(Some(&json!("Acme")), "acme"));
    assert!(matches(Some(&json!(true)), "1"));
    assert!(matches(Some(&json!(false)), "0"));
    assert!(matches(Some(&json!(true)), "true"));
    assert!(!matches(Some(&json!(true)), "0"));
    assert!(matches(Some(&json!(250)), "250"));
    assert!(matches(Some(&json!(250.0)), "250"));
    assert!(!matches(Some(&json!(null)), ""));
    assert!(!matches(None, "x"));
  }
}
