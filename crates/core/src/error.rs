use crate::i18n::Message;

/// Domain-level error shared by every crate in the workspace.
///
/// User-facing variants carry a [`Message`] so the API layer can localize
/// them; `Internal` carries raw detail that is logged but never returned.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(Message),

    #[error("Unauthorized: {0}")]
    Unauthorized(Message),

    #[error("Forbidden: {0}")]
    Forbidden(Message),

    #[error("Conflict: {0}")]
    Conflict(Message),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing required field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Validation(Message::MissingField(field.into()))
    }

    /// Shorthand for a not-found error keyed by any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
