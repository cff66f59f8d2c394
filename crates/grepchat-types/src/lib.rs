//! Shared domain types for grepchat.
//!
//! This crate contains the domain types used across the workspace:
//! credentials and identities, repository references and selections,
//! conversation logs, indexing/query payload shapes, configuration,
//! user-facing alerts, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod alert;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod index;
pub mod repository;
