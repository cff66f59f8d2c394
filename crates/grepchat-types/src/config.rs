//! Global configuration types for grepchat.
//!
//! `GrepchatConfig` represents the top-level `config.toml` that controls
//! endpoint locations, the OAuth redirect listener, and indexing defaults.
//! Client identifiers and API keys are secrets and never live here.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.grepchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepchatConfig {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub greptile: GreptileConfig,
}

/// GitHub OAuth and REST API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Base of the `/login/oauth/*` endpoints.
    pub oauth_base_url: String,
    /// Base of the REST API (`/user`, `/user/repos`).
    pub api_base_url: String,
    /// Host the loopback redirect listener binds to.
    pub redirect_host: String,
    pub redirect_port: u16,
    pub redirect_path: String,
    /// Page size for the (single) repository list request.
    pub repos_per_page: u8,
    pub user_agent: String,
}

impl GitHubConfig {
    /// The redirect URI registered with the OAuth app.
    pub fn redirect_uri(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.redirect_host, self.redirect_port, self.redirect_path
        )
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            oauth_base_url: "https://github.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            redirect_host: "127.0.0.1".to_string(),
            redirect_port: 8976,
            redirect_path: "/callback".to_string(),
            repos_per_page: 100,
            user_agent: concat!("grepchat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Greptile indexing/query API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreptileConfig {
    pub base_url: String,
    /// Provider name sent as `remote` in every repository identifier.
    pub remote: String,
    /// Branch sent with every indexing and query request.
    pub branch: String,
}

impl Default for GreptileConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.greptile.com/v2".to_string(),
            remote: "github".to_string(),
            branch: "main".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = GrepchatConfig::default();
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(config.github.redirect_uri(), "http://127.0.0.1:8976/callback");
        assert_eq!(config.greptile.branch, "main");
        assert_eq!(config.greptile.remote, "github");
    }

    #[test]
    fn test_config_deserialize_empty_uses_defaults() {
        let config: GrepchatConfig = toml::from_str("").unwrap();
        assert_eq!(config, GrepchatConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_sections() {
        let toml_str = r#"
[github]
redirect_port = 9100

[greptile]
branch = "develop"
"#;
        let config: GrepchatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.redirect_port, 9100);
        assert_eq!(config.github.redirect_path, "/callback");
        assert_eq!(config.github.redirect_uri(), "http://127.0.0.1:9100/callback");
        assert_eq!(config.greptile.branch, "develop");
        assert_eq!(config.greptile.base_url, "https://api.greptile.com/v2");
    }
}
