//! Secret provider implementations.
//!
//! - `env`: environment variable provider (read-only, highest priority)
//! - `chain`: wires the providers in resolution order

pub mod chain;
pub mod env;
