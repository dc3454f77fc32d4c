use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use sidecron_core::config::SharepointConfig;
use sidecron_crontab::error::StoreError;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Single-token acquisition gate.
///
/// The token lives in a `OnceCell`: the first caller runs the sign-in,
/// concurrent callers await that same in-flight attempt instead of issuing
/// their own. The very first sign-in gets a single extra attempt; after
/// that, failures propagate as-is.
struct SignInGate {
    token: OnceCell<String>,
    attempts: AtomicU32,
}

impl SignInGate {
    fn new() -> Self {
        Self {
            token: OnceCell::new(),
            attempts: AtomicU32::new(0),
        }
    }

    async fn acquire<F, Fut>(&self, request: F) -> Result<&str, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<String, StoreError>>,
    {
        self.token
            .get_or_try_init(|| async {
                match request().await {
                    Ok(token) => Ok(token),
                    Err(err) if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 => {
                        // Retry to connect once.
                        warn!(error = %err, "Sharepoint sign-in failed, retrying");
                        request().await
                    }
                    Err(err) => Err(err),
                }
            })
            .await
            .map(String::as_str)
    }
}

/// One shared sign-in state per Sharepoint site.
pub struct SharepointSession {
    http: reqwest::Client,
    authority: String,
    client_id: String,
    client_secret: String,
    gate: SignInGate,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SharepointSession {
    pub fn new(http: reqwest::Client, config: &SharepointConfig) -> Self {
        Self {
            http,
            authority: config.authority.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            gate: SignInGate::new(),
        }
    }

    /// Bearer token for Graph calls, signing in on first use.
    pub async fn access_token(&self) -> Result<&str, StoreError> {
        self.gate.acquire(|| self.request_token()).await
    }

    async fn request_token(&self) -> Result<String, StoreError> {
        let url = format!("{}/oauth2/v2.0/token", self.authority);
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        info!("connected to Sharepoint");
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_err() -> StoreError {
        StoreError::Auth("interaction required".to_string())
    }

    #[tokio::test]
    async fn first_sign_in_retries_once_after_failure() {
        let gate = SignInGate::new();
        let calls = AtomicU32::new(0);

        let token = gate
            .acquire(|| async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(auth_err()),
                    _ => Ok("t-1".to_string()),
                }
            })
            .await;

        assert_eq!(token.unwrap(), "t-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn later_sign_ins_do_not_retry() {
        let gate = SignInGate::new();
        let calls = AtomicU32::new(0);

        // First sign-in: one attempt plus the single retry.
        let first = gate
            .acquire(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(auth_err())
            })
            .await;
        assert!(first.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Second sign-in: the retry has been spent.
        let second = gate
            .acquire(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(auth_err())
            })
            .await;
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_request() {
        let gate = SignInGate::new();
        let calls = AtomicU32::new(0);
        let request = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok("t-1".to_string())
        };

        let (a, b) = tokio::join!(gate.acquire(request), gate.acquire(request));

        assert_eq!(a.unwrap(), "t-1");
        assert_eq!(b.unwrap(), "t-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_is_cached_after_success() {
        let gate = SignInGate::new();
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let token = gate
                .acquire(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("t-1".to_string())
                })
                .await;
            assert_eq!(token.unwrap(), "t-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn token_response_parses_graph_shape() {
        let json = r#"{"token_type":"Bearer","expires_in":3599,"access_token":"eyJ0eXAi"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "eyJ0eXAi");
    }

    #[test]
    fn authority_trailing_slash_is_normalised() {
        let config = SharepointConfig {
            authority: "https://login.microsoftonline.com/tenant/".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            domain: "example.sharepoint.com".to_string(),
            domain_id: "d".to_string(),
            site_id: "s".to_string(),
            root_path: String::new(),
        };
        let session = SharepointSession::new(reqwest::Client::new(), &config);
        assert_eq!(session.authority, "https://login.microsoftonline.com/tenant");
    }
}
