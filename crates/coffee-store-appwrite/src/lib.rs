//! Hosted document database backend for the coffee counter.
//!
//! Speaks the Appwrite 0.x database REST API through [`reqwest`]. One store
//! call is one HTTP request; nothing is retried or cached.

mod client;

pub use client::{AppwriteConfig, AppwriteStore, ClientError};
