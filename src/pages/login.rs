use crate::client::{LoginRequest, TodoClient};
use crate::form::{FormState, SubmitOutcome};
use crate::notify::Notifier;
use crate::validation::login_schema;

pub struct LoginPage {
    form: FormState,
    is_loading: bool,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            form: FormState::new(login_schema()),
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

    /// Validates, then posts the credentials. A successful login stores the
    /// session through the client's session provider.
    pub async fn submit(&mut self, client: &TodoClient, notifier: &dyn Notifier) -> SubmitOutcome {
        if self.is_loading {
            return SubmitOutcome::Ignored;
        }
        if !self.form.validate() {
            return SubmitOutcome::Invalid(self.form.errors().clone());
        }

        let request = LoginRequest {
            identifier: self.form.value("identifier").to_string(),
            password: self.form.value("password").to_string(),
        };

        self.is_loading = true;
        let result = client.login(&request).await;
        self.is_loading = false;

        match result {
            Ok(session) => {
                notifier.success(&format!("Welcome back, {}!", session.user.username));
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                notifier.error(&e.to_string());
                SubmitOutcome::Failed(e)
            }
        }
    }
}
