//! Auth service client (GoTrue-style API).
//!
//! Password sign-up/sign-in, token revocation, and bearer-token identity
//! lookup. The rest of the service never sees credentials — only the
//! `Session` this module hands back.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AuthGateway, Result};
use crate::types::{Session, WagerError};

// ---------------------------------------------------------------------------
// Wire types (auth service JSON → Rust)
// ---------------------------------------------------------------------------

/// Session payload returned by signup and password-grant endpoints.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

/// The user object, both embedded in sessions and returned by `/user`.
#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SessionResponse {
    fn into_session(self) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email.unwrap_or_default(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Auth client against the hosted backend's auth API.
pub struct RestAuth {
    http: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl RestAuth {
    /// Create a new auth client for the given project.
    pub fn new(base_url: &str, api_key: Secret<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("uniquewager/0.1.0")
            .build()
            .context("Failed to build HTTP client for auth service")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST credentials to an auth endpoint and parse the session payload.
    ///
    /// A 4xx answer means the auth service rejected the credentials
    /// (`WagerError::Auth`); everything else is a transport or service
    /// failure (`WagerError::Store`).
    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/{path}", self.base_url);
        debug!(url = %url, email = %email, "Auth request");

        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self
            .http
            .post(&url)
            .header("apikey", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| WagerError::Store(format!("Auth service request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if status.is_client_error() {
                return Err(WagerError::Auth(format!("{status}: {body}")));
            }
            return Err(WagerError::Store(format!("Auth service error {status}: {body}")));
        }

        let session: SessionResponse = resp
            .json()
            .await
            .map_err(|err| WagerError::Store(format!("Failed to parse auth session response: {err}")))?;

        Ok(session.into_session())
    }
}

// ---------------------------------------------------------------------------
// AuthGateway trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl AuthGateway for RestAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.post_credentials("signup", email, password).await?;
        info!(user_id = %session.user_id, "User signed up");
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .post_credentials("token?grant_type=password", email, password)
            .await?;
        info!(user_id = %session.user_id, "User signed in");
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", self.api_key.expose_secret())
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(|err| WagerError::Store(format!("Logout request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            if status.is_client_error() {
                return Err(WagerError::Auth(format!("Logout rejected: {status}")));
            }
            return Err(WagerError::Store(format!("Logout failed: {status}")));
        }

        info!(user_id = %session.user_id, "User signed out");
        Ok(())
    }

    async fn session_from_token(&self, access_token: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("apikey", self.api_key.expose_secret())
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|err| WagerError::Store(format!("Token lookup request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            if status.is_client_error() {
                return Err(WagerError::Auth(format!("Token rejected by auth service: {status}")));
            }
            return Err(WagerError::Store(format!("Token lookup failed: {status}")));
        }

        let user: UserResponse = resp
            .json()
            .await
            .map_err(|err| WagerError::Store(format!("Failed to parse auth user response: {err}")))?;

        Ok(Session {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
