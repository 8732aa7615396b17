// portside-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortsideError {
    // --- ERREURS DU DOMAINE (Constraints, Transform, Business Rules) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),

    #[error("Run aborted before stage '{0}'")]
    Aborted(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for PortsideError {
    fn from(err: std::io::Error) -> Self {
        PortsideError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl PortsideError {
    /// Only transient I/O failures qualify for a retry. Constraint, transform and
    /// business-rule failures are deterministic: retrying them reproduces the
    /// exact same result.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortsideError::Infrastructure(InfrastructureError::Io(_))
        )
    }
}
