//! Capability matrix for transparent authorization debugging.
//!
//! Read-only and informational; decisions are made by the guards.

use axum::{Extension, Json, Router, response::IntoResponse, routing::get};

use learnhub_auth::{AuthContext, Role, capability_matrix, require_session};

use crate::app::errors::ApiResult;

pub fn router() -> Router {
    Router::new().route("/capabilities", get(capabilities))
}

/// GET /api/rbac/capabilities - every role's allowed and forbidden capabilities
pub async fn capabilities(Extension(ctx): Extension<AuthContext>) -> ApiResult<impl IntoResponse> {
    require_session(&ctx)?;
    let role = ctx.user_role().and_then(Role::parse);
    Ok(Json(serde_json::json!({
        "role": role,
        "capabilities": capability_matrix(),
    })))
}
