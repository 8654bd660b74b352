//! In-process backend for the coffee counter.
//!
//! Behaves like the hosted document database closely enough for tests and
//! local development: it assigns `$`-prefixed metadata on create and
//! evaluates `field=value` filters as equality on the stored JSON.

mod store;

pub use store::MemoryStore;
