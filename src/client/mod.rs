//! # To-do API HTTP Client
//!
//! A thin wrapper over `reqwest` for the to-do REST API: authentication, the
//! authenticated read used by the query cache, and the create/update/delete
//! calls behind the to-do modal.
//!
//! ## Modules
//!
//! - [`auth`] - Login, registration and the session-backed Bearer header
//! - [`client`] - The pre-configured client with every API call
//! - [`error`] - [`ClientError`] and the server error message extraction
//! - [`types`] - Request and response types
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_desk::client::{LoginRequest, TodoClient};
//! use todo_desk::session::MemorySessionStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = TodoClient::new(
//!     "http://localhost:1337/api".to_string(),
//!     Arc::new(MemorySessionStore::new()),
//! )?;
//!
//! client
//!     .login(&LoginRequest {
//!         identifier: "alice@example.com".to_string(),
//!         password: "correct horse".to_string(),
//!     })
//!     .await?;
//!
//! let mine = client.my_todos().await?;
//! println!("You have {} todos", mine.todos.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod error;
pub mod types;

pub use client::TodoClient;
pub use error::ClientError;
pub use types::*;
