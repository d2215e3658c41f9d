use std::sync::Arc;

use axum::{extract::State, http::HeaderName, middleware::Next, response::Response};
use chrono::Utc;
use tracing::debug;

use learnhub_auth::{AccessError, AuthContext, SessionValidator, run_with_tenant_context};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{bearer_token, client_info, tenant_slug};

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionValidator>,
    pub services: Arc<AppServices>,
    pub tenant_header: HeaderName,
}

/// Resolve tenant and caller, then run the rest of the request inside the
/// tenant carrier.
///
/// Order: tenant header (400 when missing, 404 when unknown), bearer session
/// (401), domain user lookup by `(tenant, subject)`. A session without a
/// domain user still passes; only onboarding accepts it.
pub async fn tenant_session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let slug = tenant_slug(req.headers(), &state.tenant_header)?;
    let tenant = state.services.tenants.resolve(&slug)?;

    let claims = state
        .sessions
        .validate(bearer_token(req.headers())?, Utc::now())
        .map_err(|e| {
            debug!(tenant = %slug, error = %e, "session rejected");
            AccessError::Unauthenticated
        })?;
    let session = claims.identity();

    let user = state
        .services
        .repos
        .users
        .find_by_subject(tenant.tenant_id(), &session.subject)?;
    let ctx = match user {
        Some(user) => AuthContext::for_user(tenant.clone(), session, user.id, user.role.as_str()),
        None => AuthContext::with_session(tenant.clone(), session),
    }
    .with_client(client_info(req.headers()));

    req.extensions_mut().insert(ctx);
    Ok(run_with_tenant_context(tenant, next.run(req)).await)
}
