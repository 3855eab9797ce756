//! Client-credential token management
//!
//! The build-metadata service uses bearer tokens obtained through a
//! client-credential exchange. Expiry is decided lazily, immediately
//! before use, by probing the issuing service — never on a timer.
//!
//! The check-then-refresh sequence is deliberately unsynchronized:
//! concurrent callers may both observe an expired token and both
//! exchange. Both obtain validly issued tokens, the last write wins, and
//! the only cost is a redundant network call.

use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// A bearer token as issued by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    /// Opaque bearer string
    #[serde(rename = "access_token")]
    pub access_token: String,

    /// Issuer-declared expiry instant, retained for observability only;
    /// expiry decisions always come from the probe
    #[serde(rename = "expires_at", default)]
    pub expires_at: Option<String>,
}

/// Token holder performing lazy verification and re-exchange
pub struct AuthClient {
    http: Client,
    token_url: String,
    credentials: String,
    token: RwLock<Option<AuthToken>>,
}

impl AuthClient {
    /// Create a client against a token endpoint
    ///
    /// `credentials` is the pre-encoded basic credential of the client
    /// application.
    pub fn new(http: Client, token_url: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials: credentials.into(),
            token: RwLock::new(None),
        }
    }

    /// Current bearer string, if a token has been obtained
    pub fn access_token(&self) -> Option<String> {
        self.token.read().as_ref().map(|t| t.access_token.clone())
    }

    /// Probe whether the current token is still accepted
    ///
    /// A missing token counts as expired; so does any non-success
    /// response, including transport failures.
    pub async fn is_expired(&self) -> bool {
        let Some(token) = self.access_token() else {
            return true;
        };

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("bearer {token}"))
            .send()
            .await;

        match response {
            Ok(response) => !response.status().is_success(),
            Err(e) => {
                debug!("Token probe failed: {e}");
                true
            }
        }
    }

    /// Verify the token, exchanging a fresh one if the probe fails
    ///
    /// Returns whether a refresh occurred.
    pub async fn verify_authorization(&self) -> Result<bool> {
        if !self.is_expired().await {
            return Ok(false);
        }

        let token = self.exchange().await?;
        info!("Obtained fresh access token (expires {:?})", token.expires_at);
        *self.token.write() = Some(token);
        Ok(true)
    }

    /// Perform the client-credential exchange
    async fn exchange(&self) -> Result<AuthToken> {
        let response = self
            .http
            .post(&self.token_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("basic {}", self.credentials),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status,
                context: "token exchange".to_string(),
            });
        }

        let token: AuthToken = response.json().await?;
        if token.access_token.is_empty() {
            return Err(SyncError::Auth("empty access token".to_string()));
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(token: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "expires_at": "2026-01-01T00:00:00.000Z",
        })
    }

    #[tokio::test]
    async fn test_first_verification_exchanges() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "basic test-credential"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
            .expect(1)
            .mount(&server)
            .await;

        let auth = AuthClient::new(
            Client::new(),
            format!("{}/oauth/token", server.uri()),
            "test-credential",
        );

        assert!(auth.access_token().is_none());
        let refreshed = auth.verify_authorization().await.expect("verify");
        assert!(refreshed);
        assert_eq!(auth.access_token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let server = MockServer::start().await;

        // Exchange answers the basic-credential request once; the bearer
        // probe succeeds, so a second verification must not re-exchange.
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "basic test-credential"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "bearer tok-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let auth = AuthClient::new(
            Client::new(),
            format!("{}/oauth/token", server.uri()),
            "test-credential",
        );

        assert!(auth.verify_authorization().await.expect("first verify"));
        assert!(!auth.verify_authorization().await.expect("second verify"));
        assert_eq!(auth.access_token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_replaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "basic test-credential"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
            .expect(1)
            .mount(&server)
            .await;

        let auth = AuthClient::new(
            Client::new(),
            format!("{}/oauth/token", server.uri()),
            "test-credential",
        );
        *auth.token.write() = Some(AuthToken {
            access_token: "stale".to_string(),
            expires_at: None,
        });

        let refreshed = auth.verify_authorization().await.expect("verify");
        assert!(refreshed);
        assert_eq!(auth.access_token().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_failed_exchange_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let auth = AuthClient::new(
            Client::new(),
            format!("{}/oauth/token", server.uri()),
            "test-credential",
        );

        let result = auth.verify_authorization().await;
        assert!(matches!(result, Err(SyncError::Status { .. })));
        assert!(auth.access_token().is_none());
    }
}
