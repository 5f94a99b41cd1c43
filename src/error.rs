//! Error types for console operations.
//!
//! No failure is fatal to the console: every error is scoped to the single
//! operation that triggered it and ends up in front of the user, either inline
//! next to a form field or as a transient notification.
//!
//! - [`ValidationError`] - client-side checks that block a submission
//! - [`ParseError`] - uploaded scope documents that cannot be read
//! - [`RequestError`] - non-2xx responses from the Management API

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Main error type for console operations.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A form failed client-side validation; nothing was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An uploaded scope document could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The Management API rejected a request
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Reading an uploaded file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scope document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConsoleError {
    /// The message a notification shows for this error, with `fallback` for
    /// request failures that carry no server detail.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Parse(_) => "Invalid JSON file".to_string(),
            Self::Request(e) => e.message_or(fallback),
            Self::Io(e) => e.to_string(),
            Self::Serialization(_) => fallback.to_string(),
        }
    }
}

/// Per-field validation messages, keyed by form field name.
///
/// Ordering is by field name so rendering and assertions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// Get the message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Drop the message for a single field, e.g. once the user edits it.
    pub fn clear(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Turn the collected messages into a result: `Ok` when nothing was recorded.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors: self })
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Client-side validation failure.
///
/// Carries every field that failed so a form can mark all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {errors}")]
pub struct ValidationError {
    errors: FieldErrors,
}

impl ValidationError {
    /// Create a validation error for a single required field.
    pub fn required(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        Self { errors }
    }

    /// The per-field messages.
    pub fn fields(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_fields(self) -> FieldErrors {
        self.errors
    }
}

/// Errors raised while decoding an uploaded scope document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not valid JSON
    #[error("Invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The JSON is valid but is not an object
    #[error("Scope document must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
}

/// A non-2xx response from the Management API.
///
/// `detail` is the raw `detail` member of the response body, when the server
/// sent one. It is either a plain message or a list of field errors, each
/// carrying a `msg`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Request failed with status {status}")]
pub struct RequestError {
    pub status: u16,
    pub detail: Option<Value>,
}

impl RequestError {
    /// Create a request error from a status and an optional raw detail.
    pub fn new(status: u16, detail: Option<Value>) -> Self {
        Self { status, detail }
    }

    /// Create a request error carrying a plain detail message.
    pub fn with_detail(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, Some(Value::String(message.into())))
    }

    /// Create a 404 error for a missing entity.
    pub fn not_found(kind: &str, name: &str) -> Self {
        Self::with_detail(404, format!("{kind} '{name}' not found"))
    }

    /// Create a 409 error for an entity that already exists.
    pub fn conflict(kind: &str, name: &str) -> Self {
        Self::with_detail(409, format!("{kind} '{name}' already exists"))
    }

    /// Create a 422 error with one entry per offending field.
    pub fn unprocessable(fields: &[(&str, &str)]) -> Self {
        let detail = fields
            .iter()
            .map(|(field, msg)| serde_json::json!({ "loc": ["body", field], "msg": msg }))
            .collect();
        Self::new(422, Some(Value::Array(detail)))
    }

    /// The user-facing message carried by the server, if any.
    ///
    /// Field-error lists are flattened into their `msg` members joined with
    /// ", ". Entries without a message are skipped.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Array(entries) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join(", "))
                }
            }
            Value::String(message) if !message.is_empty() => Some(message.clone()),
            _ => None,
        }
    }

    /// The server message, or `fallback` when the server sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail_message()
            .unwrap_or_else(|| fallback.to_string())
    }
}

// Result type aliases for convenience
pub type ConsoleResult<T> = Result<T, ConsoleError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type ApiResult<T> = Result<T, RequestError>;
