use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use learnhub_auth::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Echo of the resolved tenant and caller. `userId`/`role` are null until
/// onboarding.
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    let tenant = ctx.tenant();
    Json(serde_json::json!({
        "tenantId": tenant.tenant_id().to_string(),
        "tenantSlug": tenant.tenant_slug(),
        "tenantName": tenant.tenant_name(),
        "userId": ctx.user_id().map(|id| id.to_string()),
        "role": ctx.user_role(),
        "email": ctx.user_email(),
        "name": ctx.user_name(),
    }))
}
