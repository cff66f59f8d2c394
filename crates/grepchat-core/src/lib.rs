//! Business logic and port trait definitions for grepchat.
//!
//! This crate defines the "ports" (identity provider, authorization flow,
//! code index, notifier, secret provider) that the infrastructure layer
//! implements, and the two state machines that drive a session:
//! [`auth::establisher::SessionEstablisher`] and
//! [`index::coordinator::IndexingCoordinator`].
//!
//! It depends only on `grepchat-types` -- never on `grepchat-infra` or any
//! HTTP/IO crate.

pub mod auth;
pub mod index;
pub mod notify;
pub mod secret;
