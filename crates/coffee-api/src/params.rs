//! Lenient decoders for query-string values.
//!
//! Query parameters go through the same parsers as record fields, so a
//! timestamp or flag accepted in a body is accepted in a URL too.

use chrono::{DateTime, Utc};
use coffee_core::schema::{parse_datetime, parse_flag};
use serde::{Deserialize, Deserializer, de::Error as _};

/// `1`, `0`, `true` or `false`.
pub fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .map(|s| {
      parse_flag(&s).ok_or_else(|| {
        D::Error::custom(format!("invalid flag {s:?}, expected 1, 0, true or false"))
      })
    })
    .transpose()
}

/// RFC 3339, or a naive timestamp taken as UTC.
pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .map(|s| {
      timestamp(&s).ok_or_else(|| {
        D::Error::custom(format!("invalid timestamp {s:?}, expected RFC 3339"))
      })
    })
    .transpose()
}

/// An unescaped `+` before the offset arrives as a space.
fn timestamp(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  parse_datetime(s).or_else(|| {
    let (head, offset) = s.rsplit_once(' ')?;
    parse_datetime(&format!("{head}+{offset}"))
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn offset_survives_form_decoding() {
    let expected = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
    assert_eq!(timestamp("2024-05-01T12:00:00+01:00"), Some(expected));
    assert_eq!(timestamp("2024-05-01T12:00:00 01:00"), Some(expected));
    assert_eq!(timestamp("2024-05-01T11:00:00"), Some(expected));
    assert_eq!(timestamp("2024-05-01 soon"), None);
  }
}
