//! Loopback redirect listener for the OAuth authorization-code flow.
//!
//! Binds a small axum server on the configured redirect host/port, hands
//! the consent-screen URL to a presenter (the CLI prints it), and waits for
//! GitHub to redirect the browser back with `code` and `state`. The server
//! shuts down as soon as one callback has been handled.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use grepchat_core::auth::provider::AuthorizationFlow;
use grepchat_types::auth::{AuthorizationOutcome, AuthorizationRequest};
use grepchat_types::config::GitHubConfig;
use grepchat_types::error::AuthError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str = "<!doctype html><html><body>\
<h2>Signed in to grepchat</h2><p>You can close this tab and return to the terminal.</p>\
</body></html>";
const DENIED_PAGE: &str = "<!doctype html><html><body>\
<h2>Sign-in was not completed</h2><p>You can close this tab and return to the terminal.</p>\
</body></html>";

/// Called with the consent-screen URL once the listener is ready.
pub type UrlPresenter = Box<dyn Fn(&str) + Send + Sync>;

/// Query parameters GitHub appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn into_outcome(self, expected_state: &str) -> AuthorizationOutcome {
        if let Some(error) = self.error {
            let reason = match self.error_description {
                Some(desc) => format!("{error}: {desc}"),
                None => error,
            };
            return AuthorizationOutcome::Denied { reason };
        }
        if self.state.as_deref() != Some(expected_state) {
            return AuthorizationOutcome::Denied {
                reason: "state mismatch".to_string(),
            };
        }
        match self.code {
            Some(code) if !code.is_empty() => AuthorizationOutcome::Code(code),
            _ => AuthorizationOutcome::Denied {
                reason: "missing authorization code".to_string(),
            },
        }
    }
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    tx: Arc<Mutex<Option<oneshot::Sender<AuthorizationOutcome>>>>,
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let outcome = params.into_outcome(&state.expected_state);
    let page = match outcome {
        AuthorizationOutcome::Code(_) => SUCCESS_PAGE,
        _ => DENIED_PAGE,
    };

    let sender = state.tx.lock().ok().and_then(|mut tx| tx.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => tracing::debug!("Ignoring repeated OAuth callback"),
    }
    Html(page)
}

/// [`AuthorizationFlow`] that receives the redirect on a local port.
pub struct LoopbackAuthorizationFlow {
    host: String,
    port: u16,
    path: String,
    timeout: Duration,
    presenter: UrlPresenter,
}

impl LoopbackAuthorizationFlow {
    pub fn new(config: &GitHubConfig, presenter: UrlPresenter) -> Self {
        Self {
            host: config.redirect_host.clone(),
            port: config.redirect_port,
            path: config.redirect_path.clone(),
            timeout: DEFAULT_TIMEOUT,
            presenter,
        }
    }

    /// How long to wait for the browser before treating the flow as abandoned.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the flow on an already-bound listener.
    pub async fn authorize_on(
        &self,
        listener: TcpListener,
        authorize_url: &str,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationOutcome, AuthError> {
        let addr: SocketAddr = listener
            .local_addr()
            .map_err(|e| AuthError::Listener(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        let state = CallbackState {
            expected_state: Arc::from(request.state.as_str()),
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route(&self.path, get(handle_callback))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        tracing::info!(%addr, path = %self.path, "Waiting for OAuth redirect");

        (self.presenter)(authorize_url);

        let outcome = tokio::select! {
            received = rx => received
                .map_err(|_| AuthError::Listener("callback channel closed".to_string())),
            _ = tokio::time::sleep(self.timeout) => {
                tracing::info!(timeout_secs = self.timeout.as_secs(), "OAuth redirect timed out");
                Ok(AuthorizationOutcome::Cancelled)
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("OAuth flow interrupted");
                Ok(AuthorizationOutcome::Cancelled)
            }
        };

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "Redirect listener exited with error"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Redirect listener task failed"),
            Err(_) => tracing::debug!("Redirect listener still draining; detaching"),
            Ok(Ok(Ok(()))) => {}
        }

        outcome
    }
}

impl AuthorizationFlow for LoopbackAuthorizationFlow {
    async fn authorize(
        &self,
        authorize_url: &str,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationOutcome, AuthError> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(|e| {
                AuthError::Listener(format!("failed to bind {}:{}: {e}", self.host, self.port))
            })?;
        self.authorize_on(listener, authorize_url, request).await
    }
}
