//! Field-level validation messages.
//!
//! Submissions are validated as a whole and every problem is reported at once,
//! so callers can re-present the input with a message next to each field.

use serde::Serialize;

/// Message shown when a required field is missing.
pub const REQUIRED: &str = "This field is required.";

/// Message shown when a reference points at something the caller cannot use.
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// One validation message. `field == None` marks a non-field error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

/// Ordered collection of validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: Some(field.into()),
            message: message.into(),
        });
    }

    pub fn push_non_field(&mut self, message: impl Into<String>) {
        self.0.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Merge another set of errors, nesting their field names under `prefix`
    /// (e.g. `lines[2]` + `quantity` → `lines[2].quantity`).
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for err in other.0 {
            let field = match err.field {
                Some(f) => format!("{prefix}.{f}"),
                None => prefix.to_string(),
            };
            self.0.push(FieldError {
                field: Some(field),
                message: err.message,
            });
        }
    }

    /// Keep only the messages matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&FieldError) -> bool) {
        self.0.retain(keep);
    }

    /// True when at least one message is recorded for `field`.
    pub fn has(&self, field: Option<&str>) -> bool {
        self.0.iter().any(|e| e.field.as_deref() == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Messages recorded for `field` (use `None` for non-field messages).
    pub fn messages_for(&self, field: Option<&str>) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field.as_deref() == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// `Ok(value)` when no errors were recorded, otherwise a validation error.
    pub fn into_result<T>(self, value: T) -> crate::DomainResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(crate::DomainError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            match &err.field {
                Some(field) => write!(f, "{field}: {}", err.message)?,
                None => f.write_str(&err.message)?,
            }
        }
        Ok(())
    }
}
