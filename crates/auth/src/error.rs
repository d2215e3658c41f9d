use thiserror::Error;

/// Authorization and tenant-resolution failures.
///
/// `ResourceNotFound` is returned both for rows that do not exist and for rows
/// that exist but are outside the caller's reach, so callers cannot probe for
/// existence. `Forbidden` is reserved for operations that are categorically
/// off-limits for the caller's role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{resource} not found")]
    ResourceNotFound { resource: &'static str },

    #[error("tenant '{0}' not found")]
    TenantNotFound(String),

    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("tenant context missing")]
    TenantContextMissing,
}

impl AccessError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::ResourceNotFound { resource }
    }

    /// HTTP status this error maps to at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            AccessError::InvalidRole(_) | AccessError::Forbidden(_) => 403,
            AccessError::ResourceNotFound { .. } => 404,
            AccessError::TenantNotFound(_) => 404,
            AccessError::TenantMismatch => 403,
            AccessError::TenantContextMissing => 400,
        }
    }

    /// Error name used in the `error` field of API responses.
    pub fn name(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UnauthenticatedError",
            AccessError::InvalidRole(_) => "InvalidRoleError",
            AccessError::Forbidden(_) => "ForbiddenError",
            AccessError::ResourceNotFound { .. } => "ResourceNotFoundError",
            AccessError::TenantNotFound(_) => "TenantNotFoundError",
            AccessError::TenantMismatch => "TenantMismatchError",
            AccessError::TenantContextMissing => "TenantContextMissingError",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UNAUTHENTICATED",
            AccessError::InvalidRole(_) => "INVALID_ROLE",
            AccessError::Forbidden(_) => "FORBIDDEN",
            AccessError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            AccessError::TenantNotFound(_) => "TENANT_NOT_FOUND",
            AccessError::TenantMismatch => "TENANT_MISMATCH",
            AccessError::TenantContextMissing => "TENANT_CONTEXT_MISSING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(AccessError::Unauthenticated.status_code(), 401);
        assert_eq!(AccessError::InvalidRole("x".into()).status_code(), 403);
        assert_eq!(AccessError::forbidden("no").status_code(), 403);
        assert_eq!(AccessError::not_found("course").status_code(), 404);
        assert_eq!(AccessError::TenantNotFound("acme".into()).status_code(), 404);
        assert_eq!(AccessError::TenantMismatch.status_code(), 403);
        assert_eq!(AccessError::TenantContextMissing.status_code(), 400);
    }

    #[test]
    fn not_found_message_names_resource_only() {
        assert_eq!(AccessError::not_found("assessment").to_string(), "assessment not found");
    }
}
