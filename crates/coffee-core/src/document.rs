//! Persisted records: a domain record plus the wrapper fields the remote store
//! assigns on create.

use serde::{Deserialize, Serialize};

use crate::{
  bag::Bag,
  cup::Cup,
  error::ValidationError,
  schema::{Fields, Record},
  store::RawRecord,
};

/// Principals allowed to read and write a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
  pub read:  Vec<String>,
  pub write: Vec<String>,
}

/// Identity, owning collection, and permissions of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
  pub id:          String,
  pub collection:  String,
  pub permissions: Permissions,
}

impl DocumentMeta {
  fn read(fields: &mut Fields) -> Self {
    DocumentMeta {
      id:          fields.text("id"),
      collection:  fields.text("collection"),
      permissions: fields.permissions("permissions"),
    }
  }
}

/// A stored record. Serialises flat: wrapper fields and record fields side by
/// side in one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
  #[serde(flatten)]
  pub meta:   DocumentMeta,
  #[serde(flatten)]
  pub record: T,
}

pub type BagDocument = Document<Bag>;
pub type CupDocument = Document<Cup>;

impl<T: Record> Document<T> {
  /// Decode a record returned by the store, sigil-prefixed keys and all.
  pub fn from_raw(raw: RawRecord) -> Result<Self, ValidationError> {
    let mut fields = Fields::new(raw, T::NULLABLE);
    let meta = DocumentMeta::read(&mut fields);
    let record = T::read(&mut fields);
    record.check(fields.errors_mut());
    fields.finish(Document { meta, record })
  }
}

impl<T> Document<T> {
  pub fn id(&self) -> &str { &self.meta.id }
}
