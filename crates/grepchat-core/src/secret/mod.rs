//! Secret resolution: the provider port and the chained service.

pub mod provider;
pub mod service;

/// OAuth application client id.
pub const GITHUB_CLIENT_ID: &str = "GITHUB_CLIENT_ID";
/// OAuth application client secret.
pub const GITHUB_CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";
/// Bearer key for the code-indexing service.
pub const GREPTILE_API_KEY: &str = "GREPTILE_API_KEY";

/// Every secret the application reads, in display order.
pub const KNOWN_SECRETS: [&str; 3] = [GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET, GREPTILE_API_KEY];
