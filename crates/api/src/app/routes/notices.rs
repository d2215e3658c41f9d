use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, patch},
};

use learnhub_auth::AuthContext;
use learnhub_core::NoticeId;
use learnhub_learning::{NewNotice, NoticePatch, NoticeRecord};

use crate::app::dto::Items;
use crate::app::errors::{ApiResult, parse_id};
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route("/:id", patch(update_notice).delete(delete_notice))
}

pub async fn create_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<NewNotice>,
) -> ApiResult<(StatusCode, Json<NoticeRecord>)> {
    let notice = services.repos.notices.create_notice(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn list_notices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<NoticeRecord>>> {
    Ok(Json(services.repos.notices.list_notices(&ctx)?.into()))
}

pub async fn update_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NoticePatch>,
) -> ApiResult<Json<NoticeRecord>> {
    let notice_id: NoticeId = parse_id(&id)?;
    Ok(Json(services.repos.notices.update_notice(&ctx, notice_id, body).await?))
}

pub async fn delete_notice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let notice_id: NoticeId = parse_id(&id)?;
    services.repos.notices.delete_notice(&ctx, notice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
