//! `learnhub-auth`: tenant context, roles and the RBAC guard.
//!
//! This crate is intentionally decoupled from HTTP and storage. Relationship
//! checks that need data (course ownership, enrollment, parent links) live in
//! `learnhub-infra` and call back into [`guard`] for every role decision.

pub mod capabilities;
pub mod claims;
pub mod context;
pub mod error;
pub mod guard;
pub mod roles;
pub mod token;

pub use capabilities::{Capability, RoleCapabilities, capability_matrix};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use context::{
    AuthContext, ClientInfo, SessionIdentity, TenantConfig, TenantContext, get_tenant_context,
    require_tenant_context, run_with_tenant_context,
};
pub use error::AccessError;
pub use guard::{
    Actor, require_admin, require_authentication, require_parent, require_role, require_session,
    require_student, require_teacher,
};
pub use roles::Role;
pub use token::{Hs256SessionValidator, SessionValidator, TokenError};
