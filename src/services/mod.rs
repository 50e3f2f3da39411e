pub mod beneficiaire_service;
pub mod document_service;
pub mod dossier_service;
pub mod group_service;
pub mod journal_service;
pub mod liasse_service;
pub mod localisation_service;
pub mod options_service;
pub mod serie_service;
pub mod structure_service;
pub mod type_document_service;
pub mod user_service;

use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::hierarchy::HierarchyError;

/// Failures recovered at the action-layer boundary and converted to the
/// `{success:false, error}` envelope; nothing escapes as a panic.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Integrity guard: blocked deletion (dependents exist) or blocked
    /// creation (duplicate key). The message names the blocking state.
    #[error("{0}")]
    Guard(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Manager(#[from] DatabaseError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reject blank required fields with a French validation message
pub(crate) fn require_non_blank(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!(
            "Le champ {} est obligatoire",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(require_non_blank("", "code").is_err());
        assert!(require_non_blank("   ", "nom").is_err());
        assert!(require_non_blank("AC-01", "code").is_ok());
    }
}
