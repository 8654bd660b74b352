//! Error types for `coffee-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// One field that failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

/// A record failed schema rules. Lists every offending field, not just the
/// first one encountered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
  pub errors: Vec<FieldError>,
}

impl ValidationError {
  pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.errors.push(FieldError {
      field:   field.into(),
      message: message.into(),
    });
  }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  pub fn mentions(&self, field: &str) -> bool {
    self.errors.iter().any(|e| e.field == field)
  }

  /// Names of the offending fields, in the order they were reported.
  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.errors.iter().map(|e| e.field.as_str())
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "validation failed")?;
    for (i, e) in self.errors.iter().enumerate() {
      let sep = if i == 0 { ": " } else { "; " };
      write!(f, "{sep}{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{collection} document not found: {id}")]
  NotFound { collection: String, id: String },

  #[error("document store error: {0}")]
  Store(#[source] StoreError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for Error {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::NotFound { collection, id } => Error::NotFound { collection, id },
      other => Error::Store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
