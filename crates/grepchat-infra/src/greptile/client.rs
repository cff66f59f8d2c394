//! GreptileClient -- concrete [`CodeIndex`] for the Greptile v2 API.
//!
//! Every request carries the Greptile API key as a bearer token and the
//! user's GitHub credential in `X-Github-Token`, so private repositories
//! can be read. The API key is a [`SecretString`] and is never logged.

use secrecy::{ExposeSecret, SecretString};

use grepchat_core::index::provider::CodeIndex;
use grepchat_types::auth::Credential;
use grepchat_types::error::IndexError;
use grepchat_types::index::{IndexReceipt, IndexTarget, QueryAnswer, QueryRequest};

use super::types::{IndexRequestBody, IndexResponse, QueryRequestBody, QueryResponse};

/// Greptile API client. Not `Debug`: it holds the API key.
pub struct GreptileClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GreptileClient {
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| IndexError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Override the base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str, credential: &Credential) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .header("X-Github-Token", credential.expose())
            .header("Content-Type", "application/json")
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, IndexError> {
        let response = request
            .send()
            .await
            .map_err(|e| IndexError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl CodeIndex for GreptileClient {
    fn name(&self) -> &str {
        "greptile"
    }

    async fn index_repository(
        &self,
        target: &IndexTarget,
        credential: &Credential,
    ) -> Result<IndexReceipt, IndexError> {
        let body = IndexRequestBody::from(target);
        let response = Self::send(self.post("/repositories", credential).json(&body)).await?;

        let parsed: IndexResponse = response.json().await.map_err(|e| {
            IndexError::Deserialization(format!("failed to parse indexing response: {e}"))
        })?;
        Ok(parsed.into())
    }

    async fn query(
        &self,
        request: &QueryRequest,
        credential: &Credential,
    ) -> Result<QueryAnswer, IndexError> {
        let body = QueryRequestBody::from(request);
        let response = Self::send(self.post("/query", credential).json(&body)).await?;

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            IndexError::Deserialization(format!("failed to parse query response: {e}"))
        })?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn make_client(base_url: &str) -> GreptileClient {
        GreptileClient::new(SecretString::from("gk-test"), "https://api.greptile.com/v2")
            .unwrap()
            .with_base_url(base_url)
    }

    fn target() -> IndexTarget {
        IndexTarget {
            remote: "github".to_string(),
            repository: "acme/widgets".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_client("http://localhost").name(), "greptile");
    }

    #[tokio::test]
    async fn test_index_repository_sends_both_credentials() {
        let app = Router::new().route(
            "/repositories",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer gk-test");
                assert_eq!(headers["x-github-token"], "gho_user");
                assert_eq!(body["repository"], "acme/widgets");
                assert_eq!(body["reload"], true);
                Json(json!({"response": "started repo processing"}))
            }),
        );
        let client = make_client(&serve(app).await);

        let receipt = client
            .index_repository(&target(), &Credential::new("gho_user"))
            .await
            .unwrap();
        assert_eq!(receipt.message.as_deref(), Some("started repo processing"));
    }

    #[tokio::test]
    async fn test_index_repository_error_status() {
        let app = Router::new().route(
            "/repositories",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let client = make_client(&serve(app).await);

        let err = client
            .index_repository(&target(), &Credential::new("gho_user"))
            .await
            .unwrap_err();
        match err {
            IndexError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_repository_unparseable_body_is_failure() {
        let app = Router::new().route("/repositories", post(|| async { "<html>oops</html>" }));
        let client = make_client(&serve(app).await);

        let err = client
            .index_repository(&target(), &Credential::new("gho_user"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_query_returns_message_and_sources() {
        let app = Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                assert_eq!(body["messages"][0]["role"], "user");
                Json(json!({
                    "message": "Authentication lives in `src/auth.rs`.",
                    "sources": [{
                        "repository": "acme/widgets",
                        "remote": "github",
                        "branch": "main",
                        "filepath": "src/auth.rs",
                        "linestart": 10,
                        "lineend": 42,
                        "summary": "OAuth handler"
                    }]
                }))
            }),
        );
        let client = make_client(&serve(app).await);
        let request = QueryRequest {
            question: "Where is auth?".to_string(),
            targets: vec![target()],
        };

        let answer = client
            .query(&request, &Credential::new("gho_user"))
            .await
            .unwrap();
        assert_eq!(answer.message, "Authentication lives in `src/auth.rs`.");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].label(), "acme/widgets:src/auth.rs:10-42");
    }

    #[tokio::test]
    async fn test_query_unreachable_is_transport_error() {
        // Bind and drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = make_client(&format!("http://{addr}"));
        let request = QueryRequest {
            question: "q".to_string(),
            targets: vec![target()],
        };
        let err = client
            .query(&request, &Credential::new("gho_user"))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Transport(_)));
    }
}
