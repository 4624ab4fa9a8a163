use crate::types::DbId;

/// Domain errors shared by every crate in the workspace.
///
/// Storage-level failures have their own type in `tablebuilder-db`; this
/// enum only covers outcomes the domain itself decides.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// User input rejected before anything was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An imported configuration file could not be parsed. The import is
    /// aborted as a whole.
    #[error("Import failed: {0}")]
    Import(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
