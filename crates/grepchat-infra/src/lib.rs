//! Infrastructure layer for grepchat.
//!
//! Implements the ports defined in `grepchat-core`: the GitHub identity
//! provider and loopback OAuth flow, the Greptile code index, and secret
//! providers (environment, OS keychain). Also loads `config.toml`.

pub mod config;
pub mod github;
pub mod greptile;
pub mod keychain;
pub mod secret;
