//! Façade tests against a scripted in-process store.

use std::{
  future::Future,
  sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::{
  Collections, Error, Records,
  bag::{Bag, Roast},
  cup::Cup,
  query::{BagCriteria, CupCriteria, DateWindow, Filter},
  store::{DocumentStore, RawRecord, StoreError},
};

/// Returns canned documents and remembers what it was asked.
#[derive(Default)]
struct ScriptedStore {
  documents:   Vec<RawRecord>,
  unavailable: bool,
  calls:       Mutex<Vec<(String, String, Vec<String>)>>,
}

impl ScriptedStore {
  fn with(documents: Vec<serde_json::Value>) -> Self {
    Self {
      documents: documents
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect(),
      ..Default::default()
    }
  }

  fn record(&self, op: &str, collection: &str, args: Vec<String>) {
    self
      .calls
      .lock()
      .unwrap()
      .push((op.to_owned(), collection.to_owned(), args));
  }

  fn calls(&self) -> Vec<(String, String, Vec<String>)> {
    self.calls.lock().unwrap().clone()
  }

  fn check(&self) -> Result<(), StoreError> {
    if self.unavailable {
      Err(StoreError::Unavailable("connection refused".into()))
    } else {
      Ok(())
    }
  }
}

impl DocumentStore for ScriptedStore {
  fn list<'a>(
    &'a self,
    collection: &'a str,
    filters: &'a [Filter],
  ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send + 'a {
    async move {
      self.record("list", collection, filters.iter().map(ToString::to_string).collect());
      self.check()?;
      Ok(self.documents.clone())
    }
  }

  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      self.record("get", collection, vec![id.to_owned()]);
      self.check()?;
      self
        .documents
        .iter()
        .find(|d| d.get("$id").and_then(|v| v.as_str()) == Some(id))
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
    mut data: RawRecord,
  ) -> impl Future<Output = Result<RawRecord, StoreError>> + Send + 'a {
    async move {
      self.record("create", collection, data.keys().cloned().collect());
      self.check()?;
      data.insert("$id".into(), json!("generated-1"));
      data.insert("$collection".into(), json!(collection));
      data.insert("$permissions".into(), json!({ "read": ["*"], "write": [] }));
      Ok(data)
    }
  }
}

fn records(store: ScriptedStore) -> (Records<ScriptedStore>, Arc<ScriptedStore>) {
  let store = Arc::new(store);
  let records = Records::new(
    Arc::clone(&store),
    Collections { bags: "bags".into(), cups: "cups".into() },
  );
  (records, store)
}

fn stored_bag(id: &str, start: &str, end: &str) -> serde_json::Value {
  json!({
    "$id": id,
    "$collection": "bags",
    "$permissions": { "read": ["*"], "write": [] },
    "brand": "Acme",
    "name": "House",
    "mass": 340,
    "start_date": start,
    "end_date": end,
    "active": true,
    "roast": "",
  })
}

fn stored_cup(id: &str, at: &str) -> serde_json::Value {
  json!({
    "$id": id,
    "$collection": "cups",
    "$permissions": { "read": [], "write": [] },
    "bag_id": "bag123",
    "datetime": at,
  })
}

fn new_bag(roast: Option<Roast>, mass: f64) -> Bag {
  Bag {
    brand: "Acme".into(),
    name: "Forte".into(),
    mass,
    start_date: None,
    end_date: None,
    active: true,
    roast,
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_bags_sends_filters_in_order() {
  let (records, store) = records(ScriptedStore::with(vec![stored_bag("a", "", "")]));
  let criteria = BagCriteria {
    brand: Some("Acme".into()),
    active: Some(true),
    ..Default::default()
  };

  let bags = records.list_bags(&criteria).await.unwrap();
  assert_eq!(bags.len(), 1);
  assert_eq!(bags[0].record.roast, None);

  let calls = store.calls();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].0, "list");
  assert_eq!(calls[0].1, "bags");
  assert_eq!(calls[0].2, ["brand=Acme", "active=1"]);
}

#[tokio::test]
async fn list_bags_refines_by_window_without_filters() {
  let (records, store) = records(ScriptedStore::with(vec![
    stored_bag("early", "2023-06-01", ""),
    stored_bag("inside", "2024-02-01", "2024-03-01"),
    stored_bag("late", "", "2025-01-10"),
    stored_bag("undated", "", ""),
  ]));
  let criteria = BagCriteria {
    window: DateWindow {
      start: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
      end:   chrono::NaiveDate::from_ymd_opt(2024, 12, 31),
    },
    ..Default::default()
  };

  let bags = records.list_bags(&criteria).await.unwrap();
  let ids: Vec<_> = bags.iter().map(|b| b.id()).collect();
  assert_eq!(ids, ["inside", "undated"]);
  assert!(store.calls()[0].2.is_empty());
}

#[tokio::test]
async fn list_cups_filters_on_bag_then_refines_by_time() {
  let (records, store) = records(ScriptedStore::with(vec![
    stored_cup("c1", "2024-05-01T06:00:00Z"),
    stored_cup("c2", "2024-05-01T12:00:00Z"),
    stored_cup("c3", "2024-05-02T08:00:00Z"),
  ]));
  let criteria = CupCriteria {
    bag_id: Some("bag123".into()),
    since:  Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
  };

  let cups = records.list_cups(&criteria).await.unwrap();
  let ids: Vec<_> = cups.iter().map(|c| c.id()).collect();
  assert_eq!(ids, ["c2", "c3"]);
  assert_eq!(store.calls()[0].1, "cups");
  assert_eq!(store.calls()[0].2, ["bag_id=bag123"]);
}

#[tokio::test]
async fn undecodable_record_fails_listing() {
  let mut bad = stored_bag("x", "", "");
  bad["mass"] = json!(0);
  let (records, _) = records(ScriptedStore::with(vec![stored_bag("a", "", ""), bad]));

  let err = records.list_bags(&BagCriteria::default()).await.unwrap_err();
  match err {
    Error::Validation(v) => assert_eq!(v.fields().collect::<Vec<_>>(), ["mass"]),
    other => panic!("expected validation error, got {other:?}"),
  }
}

// ─── Get ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_bag_strips_metadata_prefix() {
  let (records, _) = records(ScriptedStore::with(vec![stored_bag("abc", "2024-01-01", "")]));
  let bag = records.get_bag("abc").await.unwrap();
  assert_eq!(bag.meta.id, "abc");
  assert_eq!(bag.meta.collection, "bags");
  assert_eq!(bag.record.start_date, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let (records, _) = records(ScriptedStore::default());
  let err = records.get_cup("nope").await.unwrap_err();
  match err {
    Error::NotFound { collection, id } => {
      assert_eq!(collection, "cups");
      assert_eq!(id, "nope");
    }
    other => panic!("expected not found, got {other:?}"),
  }
}

#[tokio::test]
async fn unavailable_store_surfaces_as_store_error() {
  let (records, _) = records(ScriptedStore { unavailable: true, ..Default::default() });
  let err = records.get_bag("abc").await.unwrap_err();
  assert!(matches!(err, Error::Store(StoreError::Unavailable(_))), "{err:?}");
  let err = records.list_cups(&CupCriteria::default()).await.unwrap_err();
  assert!(matches!(err, Error::Store(StoreError::Unavailable(_))), "{err:?}");
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_bag_returns_assigned_identity() {
  let (records, store) = records(ScriptedStore::default());
  let doc = records
    .create_bag(&new_bag(Some(Roast::Espresso), 250.0))
    .await
    .unwrap();

  assert_eq!(doc.record.roast, Some(Roast::Espresso));
  assert_eq!(doc.id(), "generated-1");
  assert_eq!(doc.meta.permissions.read, ["*"]);

  let calls = store.calls();
  assert_eq!(calls[0].0, "create");
  assert!(!calls[0].2.iter().any(|k| k.starts_with('$') || k == "id"));
}

#[tokio::test]
async fn invalid_bag_is_rejected_before_sending() {
  let (records, store) = records(ScriptedStore::default());
  let err = records.create_bag(&new_bag(None, -2.0)).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(store.calls().is_empty());
}

#[tokio::test]
async fn create_cup_round_trips_timestamp() {
  let (records, _) = records(ScriptedStore::default());
  let at = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap();
  let doc = records
    .create_cup(&Cup { bag_id: "bag123".into(), datetime: at })
    .await
    .unwrap();
  assert_eq!(doc.record.datetime, at);
  assert_eq!(doc.meta.collection, "cups");
}
