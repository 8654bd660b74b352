//! Coffee cups — brew log entries referencing a bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Fields, Record};

/// One brewed cup. `bag_id` is the identity of a [`Bag`](crate::bag::Bag)
/// document; the reference is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cup {
  pub bag_id:   String,
  pub datetime: DateTime<Utc>,
}

impl Record for Cup {
  fn read(fields: &mut Fields) -> Self {
    Cup {
      bag_id:   fields.text("bag_id"),
      datetime: fields.datetime("datetime"),
    }
  }
}
