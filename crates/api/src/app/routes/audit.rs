use std::sync::Arc;

use axum::{Extension, Json, Router, routing::get};

use learnhub_audit::{AuditLogEntry, AuditStats};
use learnhub_auth::AuthContext;

use crate::app::dto::{AuditLogQuery, Items};
use crate::app::errors::ApiResult;
use crate::app::extract::ApiQuery;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/stats", get(audit_stats))
}

/// GET /api/audit-logs?actorId=&resourceType=&actionType=&limit= (ADMIN)
pub async fn list_audit_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<AuditLogQuery>,
) -> ApiResult<Json<Items<AuditLogEntry>>> {
    let entries = services
        .repos
        .audit_logs
        .list_audit_logs(&ctx, &query.into())
        .await?;
    Ok(Json(entries.into()))
}

/// GET /api/audit-logs/stats - written / rejected / failed counters (ADMIN)
pub async fn audit_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<AuditStats>> {
    Ok(Json(services.repos.audit_logs.stats(&ctx)?))
}
