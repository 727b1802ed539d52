//! Form state: field values plus per-field error messages.

use crate::client::error::ClientError;
use crate::validation::{FormValues, Schema, ValidationErrors};

/// Result of submitting a page form or the to-do modal.
#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation blocked the submission and no request was sent
    Invalid(ValidationErrors),
    /// The request failed; the form stays open with its values
    Failed(ClientError),
    /// Nothing to submit: no modal is open or a submission is running
    Ignored,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

/// Lives for one open-to-close cycle of a page or modal.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    values: FormValues,
    errors: ValidationErrors,
}

impl FormState {
    /// Blank values for every field of `schema`.
    pub fn new(schema: Schema) -> Self {
        let values = blank_values(&schema);
        Self {
            schema,
            values,
            errors: ValidationErrors::default(),
        }
    }

    /// Sets a field and drops its stale error message.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
        self.errors.remove(field);
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    /// Runs the schema and records the result. Returns whether the form may
    /// be submitted.
    pub fn validate(&mut self) -> bool {
        match self.schema.validate(&self.values) {
            Ok(()) => {
                self.errors = ValidationErrors::default();
                true
            }
            Err(errors) => {
                tracing::debug!("Form blocked by validation: {}", errors);
                self.errors = errors;
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.values = blank_values(&self.schema);
        self.errors = ValidationErrors::default();
    }
}

fn blank_values(schema: &Schema) -> FormValues {
    schema
        .field_names()
        .map(|name| (name.to_string(), String::new()))
        .collect()
}
