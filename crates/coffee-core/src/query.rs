//! Search criteria and their translation into store filters.
//!
//! A search splits in two:
//!
//! - _Filters_: `field=value` equality expressions the remote store evaluates
//!   itself. Several filters combine as a logical AND.
//! - _Refinement_: a predicate the store cannot express (date and timestamp
//!   ranges), applied to the decoded result set afterwards. It only ever
//!   narrows the set and keeps the store's order.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{bag::{Bag, Roast}, cup::Cup, document::Document};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// One server-side equality expression, rendered as `field=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub field: String,
  pub value: String,
}

impl Filter {
  pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
    Self { field: field.into(), value: value.into() }
  }
}

impl fmt::Display for Filter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}={}", self.field, self.value)
  }
}

/// Booleans travel as `1`/`0`.
fn encode_bool(b: bool) -> &'static str { if b { "1" } else { "0" } }

// ─── Criteria ────────────────────────────────────────────────────────────────

/// A set of optional search criteria for one record kind.
pub trait Criteria {
  type Record;

  /// Server-side filters, in a fixed order.
  fn filters(&self) -> Vec<Filter>;

  /// Client-side refinement: does `record` survive?
  fn keeps(&self, record: &Self::Record) -> bool;

  /// Apply [`Criteria::keeps`] to a fetched result set, preserving order.
  fn refine(&self, docs: &mut Vec<Document<Self::Record>>) {
    docs.retain(|doc| self.keeps(&doc.record));
  }
}

/// Inclusive calendar window over a bag's open/finish dates. Either side may
/// be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl DateWindow {
  /// A bag is inside when it was not opened before `start` and not finished
  /// after `end`. Missing dates never exclude a bag.
  pub fn contains(&self, bag: &Bag) -> bool {
    let after_start = match (self.start, bag.start_date) {
      (Some(lower), Some(opened)) => opened >= lower,
      _ => true,
    };
    let before_end = match (self.end, bag.end_date) {
      (Some(upper), Some(finished)) => finished <= upper,
      _ => true,
    };
    after_start && before_end
  }
}

/// Parameters for listing bags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BagCriteria {
  pub brand:  Option<String>,
  pub active: Option<bool>,
  pub roast:  Option<Roast>,
  pub window: DateWindow,
}

impl Criteria for BagCriteria {
  type Record = Bag;

  fn filters(&self) -> Vec<Filter> {
    let mut filters = Vec::new();
    if let Some(brand) = &self.brand {
      filters.push(Filter::eq("brand", brand.as_str()));
    }
    if let Some(active) = self.active {
      filters.push(Filter::eq("active", encode_bool(active)));
    }
    if let Some(roast) = self.roast {
      filters.push(Filter::eq("roast", roast.to_string()));
    }
    filters
  }

  fn keeps(&self, bag: &Bag) -> bool { self.window.contains(bag) }
}

/// Parameters for listing cups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CupCriteria {
  pub bag_id: Option<String>,
  /// Keep only cups brewed at or after this instant.
  pub since:  Option<DateTime<Utc>>,
}

impl Criteria for CupCriteria {
  type Record = Cup;

  fn filters(&self) -> Vec<Filter> {
    self
      .bag_id
      .iter()
      .map(|id| Filter::eq("bag_id", id.as_str()))
      .collect()
  }

  fn keeps(&self, cup: &Cup) -> bool {
    self.since.is_none_or(|since| cup.datetime >= since)
  }
}
