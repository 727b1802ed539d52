//! Authentication against the local-provider endpoints.
//!
//! Both login and registration answer with a JWT and the user record. On
//! success the pair is handed to the injected [`SessionStore`], which is the
//! only place the credential lives afterwards.

use std::sync::Arc;

use reqwest::Client;

use crate::client::error::{ClientError, Result};
use crate::client::types::{LoginRequest, RegisterRequest, Session};
use crate::session::SessionStore;

/// Handles `/auth/local` and `/auth/local/register` and owns the session
/// provider used for every authenticated request.
#[derive(Clone)]
pub struct TodoAuth {
    base_url: String,
    client: Client,
    sessions: Arc<dyn SessionStore>,
}

impl TodoAuth {
    pub fn new(base_url: String, client: Client, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            base_url,
            client,
            sessions,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        tracing::info!("Attempting login for identifier: {}", request.identifier);
        let url = format!("{}/auth/local", self.base_url);
        self.exchange(&url, request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        tracing::info!("Registering user: {}", request.username);
        let url = format!("{}/auth/local/register", self.base_url);
        self.exchange(&url, request).await
    }

    async fn exchange<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<Session> {
        tracing::debug!("Making authentication request to: {}", url);

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            tracing::error!("Network error during authentication: {}", e);
            ClientError::Network(e)
        })?;

        let status = response.status();
        tracing::debug!("Authentication response status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Authentication failed with status {}: {}", status, error_body);
            return Err(ClientError::from_response(status.as_u16(), &error_body));
        }

        let session: Session = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse authentication response: {}", e);
            ClientError::Decode(e.to_string())
        })?;

        self.sessions.set(session.clone())?;
        tracing::info!("Authentication successful for user: {}", session.user.username);
        tracing::debug!("Received token: {}", session.token_preview());

        Ok(session)
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.get().is_some()
    }

    pub fn logout(&self) -> Result<()> {
        tracing::info!("Clearing stored session");
        self.sessions.clear()
    }

    /// Drops a credential the server no longer accepts.
    pub fn invalidate(&self) {
        tracing::warn!("Stored token was rejected by the server; clearing session");
        if let Err(e) = self.sessions.clear() {
            tracing::error!("Failed to clear rejected session: {}", e);
        }
    }

    pub fn bearer_header(&self) -> Result<String> {
        match self.sessions.get() {
            Some(session) => {
                tracing::debug!("Using authentication token: {}", session.token_preview());
                Ok(format!("Bearer {}", session.jwt))
            }
            None => {
                tracing::error!("Attempted to make authenticated request without a session");
                Err(ClientError::NotAuthenticated)
            }
        }
    }
}
