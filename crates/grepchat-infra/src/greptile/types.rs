//! Greptile v2 API types.
//!
//! Request/response structures for `/repositories` and `/query`. They are
//! converted to and from the provider-agnostic index types at the client.

use serde::{Deserialize, Serialize};

use grepchat_types::index::{IndexReceipt, IndexTarget, QueryAnswer, QueryRequest, Source};

/// Body of `POST /repositories`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRequestBody<'a> {
    pub remote: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    pub reload: bool,
    pub notify: bool,
}

impl<'a> From<&'a IndexTarget> for IndexRequestBody<'a> {
    fn from(target: &'a IndexTarget) -> Self {
        Self {
            remote: &target.remote,
            repository: &target.repository,
            branch: &target.branch,
            reload: true,
            notify: true,
        }
    }
}

/// Response of `POST /repositories`. Both fields are optional in practice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_endpoint: Option<String>,
}

impl From<IndexResponse> for IndexReceipt {
    fn from(resp: IndexResponse) -> Self {
        IndexReceipt {
            message: resp.response.or(resp.message),
            status_endpoint: resp.status_endpoint,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMessage<'a> {
    pub content: &'a str,
    pub role: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRepository<'a> {
    pub remote: &'a str,
    pub branch: &'a str,
    pub repository: &'a str,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequestBody<'a> {
    pub messages: Vec<QueryMessage<'a>>,
    pub repositories: Vec<QueryRepository<'a>>,
    pub stream: bool,
}

impl<'a> From<&'a QueryRequest> for QueryRequestBody<'a> {
    fn from(request: &'a QueryRequest) -> Self {
        Self {
            messages: vec![QueryMessage {
                content: &request.question,
                role: "user",
            }],
            repositories: request
                .targets
                .iter()
                .map(|t| QueryRepository {
                    remote: &t.remote,
                    branch: &t.branch,
                    repository: &t.repository,
                })
                .collect(),
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySource {
    pub repository: String,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub filepath: String,
    #[serde(default)]
    pub linestart: Option<u32>,
    #[serde(default)]
    pub lineend: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl From<QuerySource> for Source {
    fn from(s: QuerySource) -> Self {
        Source {
            repository: s.repository,
            filepath: s.filepath,
            line_start: s.linestart,
            line_end: s.lineend,
            summary: s.summary,
        }
    }
}

/// Response of `POST /query` with `stream: false`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub message: String,
    #[serde(default)]
    pub sources: Vec<QuerySource>,
}

impl From<QueryResponse> for QueryAnswer {
    fn from(resp: QueryResponse) -> Self {
        QueryAnswer {
            message: resp.message,
            sources: resp.sources.into_iter().map(Source::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target() -> IndexTarget {
        IndexTarget {
            remote: "github".to_string(),
            repository: "acme/widgets".to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_index_body_shape() {
        let t = target();
        let body = serde_json::to_value(IndexRequestBody::from(&t)).unwrap();
        assert_eq!(
            body,
            json!({
                "remote": "github",
                "repository": "acme/widgets",
                "branch": "main",
                "reload": true,
                "notify": true
            })
        );
    }

    #[test]
    fn test_query_body_shape() {
        let request = QueryRequest {
            question: "Where is auth handled?".to_string(),
            targets: vec![target()],
        };
        let body = serde_json::to_value(QueryRequestBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [{"content": "Where is auth handled?", "role": "user"}],
                "repositories": [{"remote": "github", "branch": "main", "repository": "acme/widgets"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_query_response_without_sources() {
        let resp: QueryResponse = serde_json::from_str(r#"{"message":"It is in src/auth.rs"}"#).unwrap();
        let answer: QueryAnswer = resp.into();
        assert_eq!(answer.message, "It is in src/auth.rs");
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn test_index_response_camel_case() {
        let resp: IndexResponse = serde_json::from_str(
            r#"{"response":"started repo processing","statusEndpoint":"https://api.greptile.com/v2/repositories/github%3Amain%3Aacme%2Fwidgets"}"#,
        )
        .unwrap();
        let receipt: IndexReceipt = resp.into();
        assert_eq!(receipt.message.as_deref(), Some("started repo processing"));
        assert!(receipt.status_endpoint.unwrap().contains("acme%2Fwidgets"));
    }
}
