//! Schema and normalization layer.
//!
//! Raw records cross into typed values in exactly one place: [`Fields::new`]
//! rewrites the store's wire quirks into a canonical mapping, and the typed
//! readers on [`Fields`] then decode each field, collecting every failure into
//! a single [`ValidationError`].
//!
//! Two wire quirks are handled:
//!
//! - metadata keys arrive with a leading `$` (`$id`, `$collection`, ...);
//! - optional date/category fields may arrive as `""` instead of `null`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use strum::VariantNames;
use tracing::debug;

use crate::{
  bag::Roast,
  document::Permissions,
  error::ValidationError,
  store::RawRecord,
};

/// Marker the remote store puts in front of its metadata keys.
pub const SIGIL: char = '$';

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// ─── Normalization ───────────────────────────────────────────────────────────

/// Strip one leading [`SIGIL`] from every key.
///
/// When both `$name` and `name` are present the prefixed value wins: it is
/// the store's own metadata.
pub fn normalize_keys(raw: RawRecord) -> RawRecord {
  let mut out = RawRecord::new();
  let mut prefixed = Vec::new();

  for (key, value) in raw {
    match key.strip_prefix(SIGIL) {
      Some(name) => prefixed.push((name.to_owned(), value)),
      None => {
        out.insert(key, value);
      }
    }
  }

  for (name, value) in prefixed {
    if out.insert(name.clone(), value).is_some() {
      debug!(field = %name, "prefixed key shadows a plain field of the same name");
    }
  }
  out
}

/// Replace blank-string values of `fields` with `null`.
pub fn blank_to_null(raw: &mut RawRecord, fields: &[&str]) {
  for &field in fields {
    if let Some(Value::String(s)) = raw.get(field)
      && s.trim().is_empty()
    {
      raw.insert(field.to_owned(), Value::Null);
    }
  }
}

// ─── Field reader ────────────────────────────────────────────────────────────

/// A normalized raw record being decoded into typed fields.
///
/// Readers never bail out: on failure they record a [`FieldError`](crate::FieldError)
/// and hand back a placeholder, so one pass reports every bad field.
/// [`Fields::finish`] then decides whether the assembled value escapes.
#[derive(Debug)]
pub struct Fields {
  raw:    RawRecord,
  errors: ValidationError,
}

impl Fields {
  pub fn new(raw: RawRecord, nullable: &[&str]) -> Self {
    let mut raw = normalize_keys(raw);
    blank_to_null(&mut raw, nullable);
    Self { raw, errors: ValidationError::default() }
  }

  pub fn errors_mut(&mut self) -> &mut ValidationError { &mut self.errors }

  /// Return `value` if no reader or check reported a failure.
  pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
    if self.errors.is_empty() { Ok(value) } else { Err(self.errors) }
  }

  fn take(&mut self, name: &str) -> Option<Value> {
    match self.raw.remove(name) {
      None | Some(Value::Null) => None,
      Some(v) => Some(v),
    }
  }

  fn fail(&mut self, name: &str, message: impl Into<String>) {
    self.errors.push(name, message);
  }

  pub fn text(&mut self, name: &str) -> String {
    match self.take(name) {
      Some(Value::String(s)) => s,
      Some(other) => {
        self.fail(name, format!("expected a string, got {}", kind(&other)));
        String::new()
      }
      None => {
        self.fail(name, "field required");
        String::new()
      }
    }
  }

  pub fn number(&mut self, name: &str) -> f64 {
    match self.take(name) {
      Some(Value::Number(n)) => match n.as_f64() {
        Some(x) => x,
        None => {
          self.fail(name, format!("{n} is not representable as a real number"));
          0.0
        }
      },
      Some(other) => {
        self.fail(name, format!("expected a number, got {}", kind(&other)));
        0.0
      }
      None => {
        self.fail(name, "field required");
        0.0
      }
    }
  }

  /// Booleans, plus the `0`/`1` integers the store's filters use.
  pub fn boolean(&mut self, name: &str) -> bool {
    match self.take(name) {
      Some(Value::Bool(b)) => b,
      Some(Value::Number(n)) if n.as_u64() == Some(0) => false,
      Some(Value::Number(n)) if n.as_u64() == Some(1) => true,
      Some(other) => {
        self.fail(name, format!("expected a boolean, got {}", kind(&other)));
        false
      }
      None => {
        self.fail(name, "field required");
        false
      }
    }
  }

  pub fn opt_date(&mut self, name: &str) -> Option<NaiveDate> {
    match self.take(name)? {
      Value::String(s) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
        Ok(d) => Some(d),
        Err(e) => {
          self.fail(name, format!("invalid date {s:?} ({e}), expected YYYY-MM-DD"));
          None
        }
      },
      other => {
        self.fail(name, format!("expected a date string, got {}", kind(&other)));
        None
      }
    }
  }

  /// RFC 3339, a naive ISO timestamp taken as UTC, or Unix seconds.
  pub fn datetime(&mut self, name: &str) -> DateTime<Utc> {
    let parsed = match self.take(name) {
      Some(Value::String(s)) => parse_datetime(s.trim())
        .ok_or_else(|| format!("invalid timestamp {s:?}, expected RFC 3339")),
      Some(Value::Number(n)) => n
        .as_f64()
        .and_then(from_unix_seconds)
        .ok_or_else(|| format!("timestamp {n} is out of range")),
      Some(other) => Err(format!("expected a timestamp, got {}", kind(&other))),
      None => Err("field required".to_owned()),
    };
    parsed.unwrap_or_else(|message| {
      self.fail(name, message);
      DateTime::<Utc>::default()
    })
  }

  pub fn opt_roast(&mut self, name: &str) -> Option<Roast> {
    match self.take(name)? {
      Value::String(s) => match Roast::from_str(s.trim()) {
        Ok(r) => Some(r),
        Err(_) => {
          self.fail(
            name,
            format!("unknown roast {s:?}, expected one of {}", Roast::VARIANTS.join(", ")),
          );
          None
        }
      },
      other => {
        self.fail(name, format!("expected a roast name, got {}", kind(&other)));
        None
      }
    }
  }

  pub fn permissions(&mut self, name: &str) -> Permissions {
    let Some(value) = self.take(name) else {
      self.fail(name, "field required");
      return Permissions::default();
    };
    let mut map = match value {
      Value::Object(map) => map,
      other => {
        self.fail(name, format!("expected an object, got {}", kind(&other)));
        return Permissions::default();
      }
    };
    let read = self.string_list(&format!("{name}.read"), map.remove("read"));
    let write = self.string_list(&format!("{name}.write"), map.remove("write"));
    Permissions { read, write }
  }

  fn string_list(&mut self, name: &str, value: Option<Value>) -> Vec<String> {
    match value {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::Array(items)) => {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
          match item {
            Value::String(s) => out.push(s),
            other => {
              self.fail(name, format!("expected strings, found {}", kind(&other)));
              return Vec::new();
            }
          }
        }
        out
      }
      Some(other) => {
        self.fail(name, format!("expected an array, got {}", kind(&other)));
        Vec::new()
      }
    }
  }
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` one
/// taken as UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, NAIVE_DATETIME_FORMAT)
    .ok()
    .map(|naive| naive.and_utc())
}

/// Parse a boolean flag in its wire (`1`/`0`) or literal (`true`/`false`)
/// spelling, ignoring case.
pub fn parse_flag(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str() {
    "1" | "true" => Some(true),
    "0" | "false" => Some(false),
    _ => None,
  }
}

fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
  if !secs.is_finite() {
    return None;
  }
  let whole = secs.floor();
  let nanos = ((secs - whole) * 1e9) as u32;
  DateTime::from_timestamp(whole as i64, nanos)
}

fn kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// A domain record kind that can be decoded from, and encoded to, the store's
/// wire format.
pub trait Record: Serialize + Sized {
  /// Fields whose blank-string wire value means "absent".
  const NULLABLE: &'static [&'static str] = &[];

  /// Decode this record's own fields. Must not consume the document wrapper
  /// fields (`id`, `collection`, `permissions`).
  fn read(fields: &mut Fields) -> Self;

  /// Invariants on the typed value. Skip fields already reported in `errors`.
  fn check(&self, _errors: &mut ValidationError) {}

  /// Validate an unpersisted record coming off the wire or out of a request.
  fn from_raw(raw: RawRecord) -> Result<Self, ValidationError> {
    let mut fields = Fields::new(raw, Self::NULLABLE);
    let record = Self::read(&mut fields);
    record.check(fields.errors_mut());
    fields.finish(record)
  }

  /// Re-check a typed value before it leaves the process.
  fn validate(&self) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    self.check(&mut errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }

  /// Encode with canonical field names, ready for [`DocumentStore::create`](crate::store::DocumentStore::create).
  fn to_raw(&self) -> Result<RawRecord, serde_json::Error> {
    match serde_json::to_value(self)? {
      Value::Object(map) => Ok(map),
      other => Err(serde::ser::Error::custom(format!(
        "record encoded to {}, expected an object",
        kind(&other)
      ))),
    }
  }
}
