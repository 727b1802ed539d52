//! Declarative field validation for the login, registration and to-do forms.
//!
//! A [`Schema`] maps field names to ordered [`Rule`]s. Validation reports the
//! first failing rule of every field and never looks across fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Field name to submitted value.
pub type FormValues = BTreeMap<String, String>;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("Invalid email regex pattern")
});

#[derive(Debug, Clone)]
enum Check {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
}

/// A predicate on one field value plus the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Rule {
    check: Check,
    message: String,
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            check: Check::Required,
            message: message.into(),
        }
    }

    /// At least `min` characters.
    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self {
            check: Check::MinLength(min),
            message: message.into(),
        }
    }

    /// At most `max` characters.
    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self {
            check: Check::MaxLength(max),
            message: message.into(),
        }
    }

    pub fn pattern(pattern: Regex, message: impl Into<String>) -> Self {
        Self {
            check: Check::Pattern(pattern),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, value: &str) -> bool {
        match &self.check {
            Check::Required => !value.is_empty(),
            Check::MinLength(min) => value.chars().count() >= *min,
            Check::MaxLength(max) => value.chars().count() <= *max,
            Check::Pattern(pattern) => pattern.is_match(value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Vec<Rule>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.fields.push((name.into(), rules));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// First failing rule's message for one field. Unknown fields pass.
    pub fn validate_field(&self, name: &str, value: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, rules)| rules.iter().find(|rule| !rule.passes(value)))
            .map(Rule::message)
    }

    /// Checks every field; a missing value is treated as empty.
    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (name, _) in &self.fields {
            let value = values.get(name).map(String::as_str).unwrap_or("");
            if let Some(message) = self.validate_field(name, value) {
                errors.push(name.clone(), message.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Per-field messages in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: String, message: String) {
        self.errors.push((field, message));
    }

    pub fn remove(&mut self, field: &str) {
        self.errors.retain(|(name, _)| name != field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn register_schema() -> Schema {
    Schema::new()
        .field(
            "username",
            vec![
                Rule::required("Username is required"),
                Rule::min_length(5, "Username must be at least 5 characters"),
            ],
        )
        .field(
            "email",
            vec![
                Rule::required("Email is required"),
                Rule::pattern(EMAIL_PATTERN.clone(), "Invalid email"),
            ],
        )
        .field(
            "password",
            vec![
                Rule::required("Password is required"),
                Rule::min_length(8, "Password must be at least 8 characters"),
            ],
        )
}

pub fn login_schema() -> Schema {
    Schema::new()
        .field("identifier", vec![Rule::required("Email is required")])
        .field(
            "password",
            vec![
                Rule::required("Password is required"),
                Rule::min_length(8, "Password must be at least 8 characters"),
            ],
        )
}

pub fn todo_schema() -> Schema {
    Schema::new()
        .field(
            "title",
            vec![
                Rule::required("Title is required"),
                Rule::min_length(3, "Title must be at least 3 characters"),
                Rule::max_length(30, "Title must be at most 30 characters"),
            ],
        )
        .field(
            "description",
            vec![
                Rule::required("Description is required"),
                Rule::min_length(3, "Description must be at least 3 characters"),
                Rule::max_length(500, "Description must be at most 500 characters"),
            ],
        )
}
