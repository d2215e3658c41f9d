use std::sync::Arc;

use axum::{Extension, Json, Router, routing::get};

use learnhub_auth::AuthContext;
use learnhub_learning::ProgressRecord;

use crate::app::dto::{Items, ProgressQuery, UpdateProgressRequest};
use crate::app::errors::ApiResult;
use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(get_progress).post(update_progress))
}

pub async fn update_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<UpdateProgressRequest>,
) -> ApiResult<Json<ProgressRecord>> {
    let record = services
        .repos
        .progress
        .update_progress(&ctx, body.lesson_id, body.status)
        .await?;
    Ok(Json(record))
}

pub async fn get_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<ProgressQuery>,
) -> ApiResult<Json<Items<ProgressRecord>>> {
    let rows = services
        .repos
        .progress
        .get_progress(&ctx, query.student_id, query.course_id)?;
    Ok(Json(rows.into()))
}
