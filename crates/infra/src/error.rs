use thiserror::Error;

use learnhub_audit::AuditError;
use learnhub_auth::AccessError;
use learnhub_core::DomainError;

use crate::store::StoreError;

pub type RepoResult<T> = Result<T, RepoError>;

/// The only error repositories return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepoError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::Access(AccessError::not_found(resource))
    }
}

impl From<AuditError> for RepoError {
    fn from(err: AuditError) -> Self {
        let store = match err {
            AuditError::Unavailable(msg) => StoreError::Unavailable(msg),
            AuditError::Backend(msg) => StoreError::Backend(msg),
        };
        Self::Store(store)
    }
}

/// Translate a unique-constraint violation into a domain conflict with a
/// caller-facing message; other storage errors pass through.
pub(crate) fn conflict_as(message: impl Into<String>) -> impl FnOnce(StoreError) -> RepoError {
    let message = message.into();
    move |err| match err {
        StoreError::Conflict(_) => RepoError::Domain(DomainError::conflict(message)),
        other => RepoError::Store(other),
    }
}
