//! GitHub: OAuth app client, REST lookups and the loopback redirect listener.

pub mod client;
pub mod oauth;
pub mod types;

pub use client::GitHubClient;
pub use oauth::LoopbackAuthorizationFlow;
