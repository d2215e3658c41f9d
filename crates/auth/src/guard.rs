//! RBAC guard: the single place where a role list becomes allow/deny.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy check)

use learnhub_core::UserId;

use crate::{AccessError, AuthContext, Role, SessionIdentity};

/// A caller that passed the guard: authenticated, with a known role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

/// Require a session from the identity provider (domain user may not exist yet).
pub fn require_session(ctx: &AuthContext) -> Result<&SessionIdentity, AccessError> {
    ctx.session().ok_or(AccessError::Unauthenticated)
}

/// Require a resolved domain user with a role assignment.
pub fn require_authentication(ctx: &AuthContext) -> Result<UserId, AccessError> {
    match (ctx.user_id(), ctx.user_role()) {
        (Some(user_id), Some(_)) => Ok(user_id),
        _ => Err(AccessError::Unauthenticated),
    }
}

/// Require that the caller's role is known and listed in `allowed`.
pub fn require_role(ctx: &AuthContext, allowed: &[Role]) -> Result<Actor, AccessError> {
    let user_id = require_authentication(ctx)?;

    let raw = ctx.user_role().unwrap_or_default();
    let role = Role::parse(raw).ok_or_else(|| {
        tracing::debug!(tenant_id = %ctx.tenant_id(), %user_id, role = raw, "unknown role");
        AccessError::InvalidRole(raw.to_string())
    })?;

    if !allowed.contains(&role) {
        tracing::debug!(
            tenant_id = %ctx.tenant_id(),
            %user_id,
            %role,
            "role not permitted for operation"
        );
        return Err(AccessError::forbidden(format!(
            "role {role} is not permitted to perform this operation"
        )));
    }

    Ok(Actor { user_id, role })
}

pub fn require_admin(ctx: &AuthContext) -> Result<Actor, AccessError> {
    require_role(ctx, &[Role::Admin])
}

pub fn require_teacher(ctx: &AuthContext) -> Result<Actor, AccessError> {
    require_role(ctx, &[Role::Teacher])
}

pub fn require_student(ctx: &AuthContext) -> Result<Actor, AccessError> {
    require_role(ctx, &[Role::Student])
}

pub fn require_parent(ctx: &AuthContext) -> Result<Actor, AccessError> {
    require_role(ctx, &[Role::Parent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TenantConfig, TenantContext};
    use learnhub_core::TenantId;

    fn tenant() -> TenantContext {
        TenantContext::new(TenantId::new(), "acme", "Acme Academy", TenantConfig::default())
    }

    fn session() -> SessionIdentity {
        SessionIdentity {
            subject: "idp|123".to_string(),
            email: "kim@example.com".to_string(),
            name: "Kim".to_string(),
            avatar: None,
        }
    }

    fn ctx_with_role(role: &str) -> AuthContext {
        AuthContext::for_user(tenant(), session(), UserId::new(), role)
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        let ctx = AuthContext::anonymous(tenant());
        assert_eq!(require_session(&ctx), Err(AccessError::Unauthenticated));
        assert_eq!(require_authentication(&ctx), Err(AccessError::Unauthenticated));
        assert_eq!(
            require_role(&ctx, &Role::ALL),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn session_without_user_is_not_authenticated_for_roles() {
        let ctx = AuthContext::with_session(tenant(), session());
        assert!(require_session(&ctx).is_ok());
        assert_eq!(require_authentication(&ctx), Err(AccessError::Unauthenticated));
    }

    #[test]
    fn unknown_role_is_invalid() {
        let ctx = ctx_with_role("JANITOR");
        assert!(matches!(
            require_role(&ctx, &Role::ALL),
            Err(AccessError::InvalidRole(r)) if r == "JANITOR"
        ));
    }

    #[test]
    fn empty_role_is_invalid() {
        let ctx = ctx_with_role("");
        assert!(matches!(
            require_role(&ctx, &Role::ALL),
            Err(AccessError::InvalidRole(_))
        ));
    }

    #[test]
    fn role_outside_list_is_forbidden() {
        let ctx = ctx_with_role("PARENT");
        assert!(matches!(
            require_role(&ctx, &[Role::Student]),
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(require_student(&ctx), Err(AccessError::Forbidden(_))));
    }

    #[test]
    fn allowed_role_returns_actor() {
        let ctx = ctx_with_role("teacher");
        let actor = require_role(&ctx, &[Role::Admin, Role::Teacher]).unwrap();
        assert_eq!(actor.role, Role::Teacher);
        assert_eq!(Some(actor.user_id), ctx.user_id());
    }

    #[test]
    fn wrappers_accept_only_their_role() {
        for role in Role::ALL {
            let ctx = ctx_with_role(role.as_str());
            assert_eq!(require_admin(&ctx).is_ok(), role == Role::Admin);
            assert_eq!(require_teacher(&ctx).is_ok(), role == Role::Teacher);
            assert_eq!(require_student(&ctx).is_ok(), role == Role::Student);
            assert_eq!(require_parent(&ctx).is_ok(), role == Role::Parent);
        }
    }
}
