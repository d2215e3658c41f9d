use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::get,
};

use learnhub_auth::AuthContext;
use learnhub_core::CourseId;
use learnhub_infra::CourseAnalytics;
use learnhub_learning::{CourseRecord, LessonRecord, NewCourse, NewLesson};

use crate::app::dto::Items;
use crate::app::errors::{ApiResult, parse_id};
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:id", get(get_course))
        .route("/:id/lessons", get(list_lessons).post(create_lesson))
        .route("/:id/analytics", get(course_analytics))
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<NewCourse>,
) -> ApiResult<(StatusCode, Json<CourseRecord>)> {
    let course = services.repos.courses.create_course(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<CourseRecord>>> {
    Ok(Json(services.repos.courses.list_courses(&ctx)?.into()))
}

pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourseRecord>> {
    let course_id: CourseId = parse_id(&id)?;
    Ok(Json(services.repos.courses.get_course_by_id(&ctx, course_id)?))
}

pub async fn create_lesson(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<NewLesson>,
) -> ApiResult<(StatusCode, Json<LessonRecord>)> {
    let course_id: CourseId = parse_id(&id)?;
    let lesson = services.repos.courses.create_lesson(&ctx, course_id, body).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn list_lessons(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Items<LessonRecord>>> {
    let course_id: CourseId = parse_id(&id)?;
    Ok(Json(services.repos.courses.list_lessons(&ctx, course_id)?.into()))
}

pub async fn course_analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourseAnalytics>> {
    let course_id: CourseId = parse_id(&id)?;
    Ok(Json(services.repos.progress.course_analytics(&ctx, course_id)?))
}
