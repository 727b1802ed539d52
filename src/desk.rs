//! The current user's to-do list and the modal used to create, edit and
//! remove items.
//!
//! ```text
//! Closed ──open_*──▶ Open(mode) ──submit──▶ Submitting(mode) ──ok──▶ Closed
//!                       ▲                          │
//!                       └──────────failure─────────┘
//! ```
//!
//! Every successful mutation bumps the shared [`Revision`], which changes the
//! list keys and makes the next load refetch.

use std::sync::Arc;

use crate::client::{Todo, TodoClient, UpdateTodoRequest, UserTodos};
use crate::form::{FormState, SubmitOutcome};
use crate::notify::Notifier;
use crate::query::{QueryCache, QueryKey, QueryObserver, QueryRequest, QueryState, Revision};
use crate::validation::todo_schema;

pub const EMPTY_MESSAGE: &str = "You don't have any todos yet!";

#[derive(Debug, Clone, PartialEq)]
pub enum ModalMode {
    Create,
    Edit(Todo),
    Remove(Todo),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Open(ModalMode),
    Submitting(ModalMode),
}

/// Outcome of the bulk "generate todos" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    pub requested: usize,
    pub created: usize,
    pub failed: usize,
}

pub struct TodoDesk {
    client: TodoClient,
    cache: QueryCache<TodoClient>,
    revision: Revision,
    observer: QueryObserver<UserTodos>,
    notifier: Arc<dyn Notifier>,
    state: ModalState,
    form: FormState,
}

impl TodoDesk {
    pub fn new(
        client: TodoClient,
        cache: QueryCache<TodoClient>,
        revision: Revision,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            cache,
            revision,
            observer: QueryObserver::new(),
            notifier,
            state: ModalState::Closed,
            form: FormState::new(todo_schema()),
        }
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new("todoList").param("revision", self.revision.current())
    }

    fn request() -> QueryRequest {
        QueryRequest::new("/users/me").param("populate", "todos")
    }

    /// Loads the user's to-dos for the current revision.
    pub async fn load(&mut self) -> QueryState<UserTodos> {
        let key = self.key();
        self.observer.fetch(&self.cache, key, &Self::request()).await
    }

    pub fn todos(&mut self) -> QueryState<UserTodos> {
        self.observer.state(&self.cache)
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn open_create(&mut self) {
        self.form.reset();
        self.state = ModalState::Open(ModalMode::Create);
    }

    pub fn open_edit(&mut self, todo: &Todo) {
        self.form.reset();
        self.form.set("title", todo.title.clone());
        self.form.set("description", todo.description.clone());
        self.state = ModalState::Open(ModalMode::Edit(todo.clone()));
    }

    /// Confirmation only; the form is not used.
    pub fn open_remove(&mut self, todo: &Todo) {
        self.form.reset();
        self.state = ModalState::Open(ModalMode::Remove(todo.clone()));
    }

    pub fn close(&mut self) {
        self.form.reset();
        self.state = ModalState::Closed;
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let mode = match &self.state {
            ModalState::Open(mode) => mode.clone(),
            _ => return SubmitOutcome::Ignored,
        };

        let needs_fields = !matches!(mode, ModalMode::Remove(_));
        if needs_fields && !self.form.validate() {
            return SubmitOutcome::Invalid(self.form.errors().clone());
        }

        self.state = ModalState::Submitting(mode.clone());
        let title = self.form.value("title").to_string();
        let description = self.form.value("description").to_string();

        let (result, done) = match &mode {
            ModalMode::Create => (
                self.client.create_todo(&title, &description).await.map(|_| ()),
                "Todo has been added",
            ),
            ModalMode::Edit(todo) => (
                self.client
                    .update_todo(&todo.path_id(), UpdateTodoRequest { title, description })
                    .await
                    .map(|_| ()),
                "Todo has been updated",
            ),
            ModalMode::Remove(todo) => (
                self.client.delete_todo(&todo.path_id()).await,
                "Todo has been removed",
            ),
        };

        match result {
            Ok(()) => {
                self.notifier.success(done);
                self.close();
                self.revision.bump();
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::error!("Todo modal submission failed: {}", e);
                self.notifier.error(&e.to_string());
                self.state = ModalState::Open(mode);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Creates `count` to-dos one request at a time. A failed item is logged
    /// and skipped; the rest are still attempted.
    pub async fn generate(&mut self, count: usize) -> GenerateSummary {
        let mut summary = GenerateSummary {
            requested: count,
            created: 0,
            failed: 0,
        };
        let batch = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");

        for n in 1..=count {
            let title = format!("Generated todo {}", n);
            let description = format!("Item {} of {} generated at {}", n, count, batch);
            match self.client.create_todo(&title, &description).await {
                Ok(_) => summary.created += 1,
                Err(e) => {
                    tracing::warn!("Failed to generate todo {} of {}: {}", n, count, e);
                    summary.failed += 1;
                }
            }
        }

        if summary.created > 0 {
            self.revision.bump();
            self.notifier
                .success(&format!("Generated {} of {} todos", summary.created, count));
        } else if count > 0 {
            self.notifier.error("Failed to generate todos");
        }
        tracing::info!(
            "Generated todos: {} created, {} failed",
            summary.created,
            summary.failed
        );
        summary
    }
}
