use super::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("no {kind} at {path}")]
    InvalidPath { kind: EntityKind, path: String },

    #[error("{field} {reason}")]
    Validation { field: String, reason: String },

    #[error("upload failed: {0}")]
    Upload(String),
}

impl EditError {
    pub fn invalid_path(kind: EntityKind, indices: &[usize]) -> Self {
        let path = indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("/");
        EditError::InvalidPath { kind, path }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EditError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EditError::InvalidPath { .. } => "invalid_path",
            EditError::Validation { .. } => "validation_failed",
            EditError::Upload(_) => "upload_failed",
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;
