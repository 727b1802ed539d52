use crate::client::{RegisterRequest, TodoClient};
use crate::form::{FormState, SubmitOutcome};
use crate::notify::Notifier;
use crate::validation::register_schema;

pub struct RegisterPage {
    form: FormState,
    is_loading: bool,
}

impl Default for RegisterPage {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPage {
    pub fn new() -> Self {
        Self {
            form: FormState::new(register_schema()),
            is_loading: false,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub async fn submit(&mut self, client: &TodoClient, notifier: &dyn Notifier) -> SubmitOutcome {
        if self.is_loading {
            return SubmitOutcome::Ignored;
        }
        if !self.form.validate() {
            return SubmitOutcome::Invalid(self.form.errors().clone());
        }

        let request = RegisterRequest {
            username: self.form.value("username").to_string(),
            email: self.form.value("email").to_string(),
            password: self.form.value("password").to_string(),
        };

        self.is_loading = true;
        let result = client.register(&request).await;
        self.is_loading = false;

        match result {
            Ok(session) => {
                notifier.success(&format!("Account {} created", session.user.username));
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                notifier.error(&e.to_string());
                SubmitOutcome::Failed(e)
            }
        }
    }
}
