//! Greptile code-indexing API client.

pub mod client;
pub mod types;

pub use client::GreptileClient;
