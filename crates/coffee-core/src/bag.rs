//! Coffee bags — the inventory of purchased coffee.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, VariantNames};

use crate::{
  error::ValidationError,
  schema::{Fields, Record},
};

/// Roast category of the beans in a bag.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Roast {
  Light,
  LightMedium,
  Medium,
  MediumDark,
  Dark,
  French,
  Espresso,
}

/// A bag of coffee, as entered by the user.
///
/// `start_date` is when the bag was opened, `end_date` when it was finished.
/// Their relative order is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bag {
  pub brand:      String,
  pub name:       String,
  /// Grams; always strictly positive once validated.
  pub mass:       f64,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub active:     bool,
  pub roast:      Option<Roast>,
}

impl Record for Bag {
  const NULLABLE: &'static [&'static str] = &["start_date", "end_date", "roast"];

  fn read(fields: &mut Fields) -> Self {
    Bag {
      brand:      fields.text("brand"),
      name:       fields.text("name"),
      mass:       fields.number("mass"),
      start_date: fields.opt_date("start_date"),
      end_date:   fields.opt_date("end_date"),
      active:     fields.boolean("active"),
      roast:      fields.opt_roast("roast"),
    }
  }

  fn check(&self, errors: &mut ValidationError) {
    if !(self.mass.is_finite() && self.mass > 0.0) && !errors.mentions("mass") {
      errors.push("mass", format!("must be a positive number, got {}", self.mass));
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use strum::IntoEnumIterator;

  use super::*;
  use crate::store::RawRecord;

  fn raw(v: serde_json::Value) -> RawRecord {
    serde_json::from_value(v).unwrap()
  }

  fn acme() -> serde_json::Value {
    json!({
      "brand": "Acme",
      "name": "House Blend",
      "mass": 340.0,
      "start_date": "2024-01-05",
      "end_date": "2024-01-30",
      "active": false,
      "roast": "MEDIUM_DARK",
    })
  }

  #[test]
  fn decodes_full_bag() {
    let bag = Bag::from_raw(raw(acme())).unwrap();
    assert_eq!(bag.brand, "Acme");
    assert_eq!(bag.mass, 340.0);
    assert_eq!(bag.start_date, NaiveDate::from_ymd_opt(2024, 1, 5));
    assert_eq!(bag.roast, Some(Roast::MediumDark));
  }

  #[test]
  fn blank_optionals_become_absent() {
    let mut v = acme();
    v["start_date"] = json!("");
    v["end_date"] = json!("");
    v["roast"] = json!("");
    let bag = Bag::from_raw(raw(v)).unwrap();
    assert_eq!(bag.start_date, None);
    assert_eq!(bag.end_date, None);
    assert_eq!(bag.roast, None);
  }

  #[test]
  fn missing_optionals_are_absent() {
    let bag = Bag::from_raw(raw(json!({
      "brand": "Acme",
      "name": "Decaf",
      "mass": 12,
      "active": true,
    })))
    .unwrap();
    assert_eq!(bag.start_date, None);
    assert_eq!(bag.roast, None);
    assert!(bag.active);
  }

  #[test]
  fn non_positive_mass_is_rejected() {
    for mass in [json!(0), json!(-1.5), json!(-0.0)] {
      let mut v = acme();
      v["mass"] = mass;
      let err = Bag::from_raw(raw(v)).unwrap_err();
      assert_eq!(err.fields().collect::<Vec<_>>(), ["mass"]);
    }
  }

  #[test]
  fn non_positive_mass_fails_validate() {
    let mut bag = Bag::from_raw(raw(acme())).unwrap();
    assert!(bag.validate().is_ok());
    bag.mass = 0.0;
    assert!(bag.validate().is_err());
    bag.mass = f64::NAN;
    assert!(bag.validate().is_err());
  }

  #[test]
  fn every_offending_field_is_reported() {
    let err = Bag::from_raw(raw(json!({
      "brand": "Acme",
      "name": "Blend",
      "mass": -3,
      "start_date": "yesterday",
      "end_date": "2024-02-30",
      "active": true,
      "roast": "BURNT",
    })))
    .unwrap_err();
    assert_eq!(
      err.fields().collect::<Vec<_>>(),
      ["start_date", "end_date", "roast", "mass"]
    );
  }

  #[test]
  fn mass_type_error_is_reported_once() {
    let mut v = acme();
    v["mass"] = json!("heavy");
    let err = Bag::from_raw(raw(v)).unwrap_err();
    assert_eq!(err.errors.len(), 1);
  }

  #[test]
  fn roast_names_round_trip_through_strum_and_serde() {
    for roast in Roast::iter() {
      let name = roast.to_string();
      assert_eq!(serde_json::to_value(roast).unwrap(), json!(name));
      assert_eq!(name.parse::<Roast>().unwrap(), roast);
    }
    assert_eq!(Roast::VARIANTS.len(), 7);
    let name: &str = Roast::LightMedium.as_ref();
    assert_eq!(name, "LIGHT_MEDIUM");
  }

  #[test]
  fn to_raw_uses_canonical_names() {
    let bag = Bag::from_raw(raw(acme())).unwrap();
    let out = bag.to_raw().unwrap();
    assert_eq!(out.get("roast"), Some(&json!("MEDIUM_DARK")));
    assert_eq!(out.get("start_date"), Some(&json!("2024-01-05")));
  }
}
