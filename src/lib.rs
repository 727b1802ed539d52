//! # Todo Desk
//!
//! A client for a Strapi-style to-do REST API: log in or register, browse
//! the paginated to-do collection, and create, edit or remove your own items
//! through a validated modal.
//!
//! ## Layers
//!
//! - [`client`] - The single pre-configured HTTP client and API types
//! - [`session`] - Injected session providers (memory and file backed)
//! - [`query`] - Keyed, stale-while-revalidate cache for authenticated reads
//! - [`validation`] and [`form`] - Field rules and form state
//! - [`pages`] - Login, registration and the paginated list
//! - [`desk`] - The user's to-do list with the create/edit/remove modal
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_desk::{ClientConfig, QueryCache, Revision, TodoClient, TodosPage};
//! use todo_desk::session::FileSessionStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env();
//! let sessions = Arc::new(FileSessionStore::new(&config.session_file));
//! let client = TodoClient::with_config(&config, sessions)?;
//!
//! let cache = QueryCache::new(client.clone());
//! let mut page = TodosPage::new(cache, Revision::new());
//! page.load().await;
//! println!("{}", page.view());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod desk;
pub mod form;
pub mod notify;
pub mod pages;
pub mod pagination;
pub mod query;
pub mod session;
pub mod validation;

pub use client::{ClientError, TodoClient};
pub use config::ClientConfig;
pub use desk::TodoDesk;
pub use pages::{LoginPage, RegisterPage, TodosPage};
pub use query::{QueryCache, Revision};
