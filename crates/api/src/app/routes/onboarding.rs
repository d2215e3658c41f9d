use std::sync::Arc;

use axum::{Extension, Json, Router, routing::post};

use learnhub_auth::AuthContext;
use learnhub_learning::UserRecord;

use crate::app::dto::AssignRoleRequest;
use crate::app::errors::ApiResult;
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/assign-role", post(assign_role))
}

/// POST /api/onboarding/assign-role - create the caller's user once; repeat
/// calls with the same role return it unchanged.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<AssignRoleRequest>,
) -> ApiResult<Json<UserRecord>> {
    let user = services.repos.users.assign_role(&ctx, &body.role).await?;
    Ok(Json(user))
}
