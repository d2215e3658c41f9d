//! Request-scoped tenant context carrier.
//!
//! The tenant identity for a request is installed once, at the edge, with
//! [`run_with_tenant_context`] and read everywhere below with
//! [`get_tenant_context`] / [`require_tenant_context`]. The value lives in a
//! tokio task-local, so concurrent requests on the same runtime never observe
//! each other's tenant.
//!
//! Task-locals do not follow `tokio::spawn`. Work spawned from inside a
//! request must re-enter the scope explicitly with the context it was given.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use learnhub_core::{TenantId, UserId};

use crate::AccessError;

tokio::task_local! {
    static TENANT_CONTEXT: TenantContext;
}

/// Per-tenant presentation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    #[serde(default)]
    pub theme: serde_json::Value,
}

/// Tenant identity for one inbound request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantContext {
    tenant_id: TenantId,
    tenant_slug: Arc<str>,
    tenant_name: Arc<str>,
    tenant_config: Arc<TenantConfig>,
}

impl TenantContext {
    pub fn new(
        tenant_id: TenantId,
        tenant_slug: impl Into<Arc<str>>,
        tenant_name: impl Into<Arc<str>>,
        tenant_config: TenantConfig,
    ) -> Self {
        Self {
            tenant_id,
            tenant_slug: tenant_slug.into(),
            tenant_name: tenant_name.into(),
            tenant_config: Arc::new(tenant_config),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn tenant_slug(&self) -> &str {
        &self.tenant_slug
    }

    pub fn tenant_name(&self) -> &str {
        &self.tenant_name
    }

    pub fn tenant_config(&self) -> &TenantConfig {
        &self.tenant_config
    }
}

/// Run `fut` with `context` installed as the active tenant context.
pub async fn run_with_tenant_context<F>(context: TenantContext, fut: F) -> F::Output
where
    F: Future,
{
    TENANT_CONTEXT.scope(context, fut).await
}

/// The active tenant context, or `None` outside any scope.
pub fn get_tenant_context() -> Option<TenantContext> {
    TENANT_CONTEXT.try_with(Clone::clone).ok()
}

/// The active tenant context; fails closed when none is installed.
pub fn require_tenant_context() -> Result<TenantContext, AccessError> {
    get_tenant_context().ok_or(AccessError::TenantContextMissing)
}

/// Identity asserted by the session layer (external identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Network details of the calling client, recorded on audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Tenant context extended with the caller's identity and role.
///
/// `user_role` is kept as the raw string delivered by the role store; it is
/// only ever interpreted by [`crate::guard::require_role`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    tenant: TenantContext,
    session: Option<SessionIdentity>,
    user_id: Option<UserId>,
    user_role: Option<String>,
    client: ClientInfo,
}

impl AuthContext {
    /// A context with no session at all.
    pub fn anonymous(tenant: TenantContext) -> Self {
        Self {
            tenant,
            session: None,
            user_id: None,
            user_role: None,
            client: ClientInfo::default(),
        }
    }

    /// A context for a session that has no domain user yet (pre-onboarding).
    pub fn with_session(tenant: TenantContext, session: SessionIdentity) -> Self {
        Self {
            tenant,
            session: Some(session),
            user_id: None,
            user_role: None,
            client: ClientInfo::default(),
        }
    }

    /// A fully resolved context.
    pub fn for_user(
        tenant: TenantContext,
        session: SessionIdentity,
        user_id: UserId,
        user_role: impl Into<String>,
    ) -> Self {
        Self {
            tenant,
            session: Some(session),
            user_id: Some(user_id),
            user_role: Some(user_role.into()),
            client: ClientInfo::default(),
        }
    }

    pub fn with_client(mut self, client: ClientInfo) -> Self {
        self.client = client;
        self
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant.tenant_id()
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn user_role(&self) -> Option<&str> {
        self.user_role.as_deref()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.email.as_str())
    }

    pub fn user_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }
}
