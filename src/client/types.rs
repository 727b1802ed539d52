//! Type definitions for the to-do REST API.
//!
//! The API follows Strapi conventions: mutations wrap their payload in a
//! `data` object, collection reads return `{data, meta}`, and failures return
//! `{error: {status, name, message}}`.
//!
//! ## Key Types
//!
//! - [`Session`] - The persisted credential bundle returned by the auth endpoints
//! - [`Todo`] - A single to-do item
//! - [`TodoPage`] - One page of the paginated collection endpoint
//! - [`UserTodos`] - The current user with their to-dos populated
//! - [`ErrorResponse`] - The structured error body

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication response and persisted session.
///
/// Both `/auth/local` and `/auth/local/register` answer with this shape, and
/// it is stored verbatim by the session provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// JWT used as the Bearer credential
    pub jwt: String,
    /// The authenticated user
    pub user: User,
}

impl Session {
    /// First ten characters of the token, for logs.
    pub fn token_preview(&self) -> String {
        format!("{}...", self.jwt.chars().take(10).collect::<String>())
    }
}

/// A user account as the API reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

/// Payload for `POST /auth/local`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

/// Payload for `POST /auth/local/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A to-do item.
///
/// Strapi v5 addresses documents by `documentId`; older deployments only
/// expose the numeric `id`. [`Todo::path_id`] picks whichever applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning user, present only when the relation is populated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Identifier used in `/todos/:id` paths.
    pub fn path_id(&self) -> String {
        match &self.document_id {
            Some(document_id) => document_id.clone(),
            None => self.id.to_string(),
        }
    }
}

/// Envelope used by every mutation body: `{"data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Fields sent when creating a to-do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: String,
    /// Owner relation, sent as a list of user ids
    pub user: Vec<u64>,
}

/// Fields sent when editing a to-do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: String,
    pub description: String,
}

/// One page of `GET /todos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoPage {
    pub data: Vec<Todo>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub pagination: Pagination,
}

/// Pagination block reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// `GET /users/me?populate=todos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTodos {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

/// Structured error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
}
