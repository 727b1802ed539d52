use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{
    auth::TodoAuth,
    error::{ClientError, Result},
    types::*,
};
use crate::config::ClientConfig;
use crate::pagination::PageQuery;
use crate::query::{QueryFetcher, QueryRequest};
use crate::session::SessionStore;

/// The one pre-configured request sender.
///
/// Built once at start-up and cloned into every consumer; clones share the
/// connection pool and the session provider.
#[derive(Clone)]
pub struct TodoClient {
    base_url: String,
    client: Client,
    auth: TodoAuth,
}

impl TodoClient {
    pub fn new(base_url: String, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_config(&ClientConfig::new(base_url), sessions)
    }

    pub fn with_config(config: &ClientConfig, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::debug!("HTTP client ready for {} (timeout {:?})", base_url, config.timeout);

        Ok(Self {
            auth: TodoAuth::new(base_url.clone(), client.clone(), sessions),
            client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Session operations
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        self.auth.login(request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        self.auth.register(request).await
    }

    pub fn logout(&self) -> Result<()> {
        self.auth.logout()
    }

    pub fn session(&self) -> Option<Session> {
        self.auth.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn get_token_preview(&self) -> Option<String> {
        self.auth.session().map(|session| session.token_preview())
    }

    /// Authenticated GET of a described request, returning the raw payload.
    pub async fn get_json(&self, request: &QueryRequest) -> Result<Value> {
        self.get(request, "load data").await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        request: &QueryRequest,
        action: &str,
    ) -> Result<T> {
        let url = request.url(&self.base_url);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(&url), 200, action).await?;
        decode(response, action).await
    }

    // Todo operations
    pub async fn my_todos(&self) -> Result<UserTodos> {
        self.get(&QueryRequest::new("/users/me").param("populate", "todos"), "load your todos")
            .await
    }

    pub async fn list_todos(&self, query: &PageQuery) -> Result<TodoPage> {
        self.get(&query.request(), "load todos").await
    }

    /// Creates a to-do owned by the current session's user.
    pub async fn create_todo(&self, title: &str, description: &str) -> Result<Todo> {
        let session = self.auth.session().ok_or(ClientError::NotAuthenticated)?;
        let url = format!("{}/todos", self.base_url);
        let body = DataEnvelope {
            data: CreateTodoRequest {
                title: title.to_string(),
                description: description.to_string(),
                user: vec![session.user.id],
            },
        };

        let response = self.send(self.client.post(&url).json(&body), 201, "create todo").await?;
        let created: DataEnvelope<Todo> = decode(response, "create todo").await?;
        tracing::info!("Created todo {} ({})", created.data.path_id(), created.data.title);
        Ok(created.data)
    }

    pub async fn update_todo(&self, id: &str, request: UpdateTodoRequest) -> Result<Todo> {
        let url = format!("{}/todos/{}", self.base_url, urlencoding::encode(id));
        let body = DataEnvelope { data: request };

        let response = self.send(self.client.put(&url).json(&body), 200, "update todo").await?;
        let updated: DataEnvelope<Todo> = decode(response, "update todo").await?;
        tracing::info!("Updated todo {}", id);
        Ok(updated.data)
    }

    pub async fn delete_todo(&self, id: &str) -> Result<()> {
        let url = format!("{}/todos/{}", self.base_url, urlencoding::encode(id));
        self.send(self.client.delete(&url), 204, "delete todo").await?;
        tracing::info!("Deleted todo {}", id);
        Ok(())
    }

    /// Attaches the Bearer header, sends, and checks the status against the
    /// endpoint's contract.
    async fn send(&self, builder: RequestBuilder, expected: u16, action: &str) -> Result<Response> {
        let auth_header = self.auth.bearer_header()?;

        let response = builder
            .header("Authorization", auth_header)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error trying to {}: {}", action, e);
                ClientError::Network(e)
            })?;

        let status = response.status();
        tracing::debug!("{} response status: {}", action, status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Failed to {} with status {}: {}", action, status, error_body);

            let err = ClientError::from_response(status.as_u16(), &error_body);
            if matches!(err, ClientError::Unauthorized { .. }) {
                self.auth.invalidate();
            }
            return Err(err);
        }

        if status.as_u16() != expected {
            tracing::error!("Unexpected status for {}: {} (expected {})", action, status, expected);
            return Err(ClientError::UnexpectedStatus {
                expected,
                actual: status.as_u16(),
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    response.json().await.map_err(|e| {
        tracing::error!("Failed to parse response to {}: {}", action, e);
        ClientError::Decode(e.to_string())
    })
}

#[async_trait::async_trait]
impl QueryFetcher for TodoClient {
    async fn fetch(&self, request: &QueryRequest) -> Result<Value> {
        self.get_json(request).await
    }
}
