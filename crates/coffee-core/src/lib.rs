//! Core types and trait definitions for the coffee counter.
//!
//! This crate is deliberately free of HTTP and network dependencies. The
//! remote document database is reached only through the
//! [`store::DocumentStore`] trait, which backend crates implement.

pub mod bag;
pub mod cup;
pub mod document;
pub mod error;
pub mod query;
pub mod records;
pub mod schema;
pub mod store;

pub use error::{Error, FieldError, Result, ValidationError};
pub use records::{Collections, Records};

#[cfg(test)]
mod tests;
