use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};

use learnhub_auth::AuthContext;
use learnhub_core::UserId;
use learnhub_learning::{ParentLink, StudentProfile, UserRecord};

use crate::app::dto::{Items, LinkChildRequest, StudentProfileRequest};
use crate::app::errors::{ApiResult, parse_id};
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/student-profile", post(assign_student_class))
        .route("/:id/children", post(link_child))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<UserRecord>>> {
    Ok(Json(services.repos.users.list_users(&ctx)?.into()))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserRecord>> {
    let user_id: UserId = parse_id(&id)?;
    Ok(Json(services.repos.users.get_user(&ctx, user_id)?))
}

/// POST /api/users/:id/student-profile - place a student in a class.
pub async fn assign_student_class(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StudentProfileRequest>,
) -> ApiResult<Json<StudentProfile>> {
    let student_id: UserId = parse_id(&id)?;
    let profile = services
        .repos
        .users
        .assign_student_class(&ctx, student_id, body.class_id, body.section_id)
        .await?;
    Ok(Json(profile))
}

/// POST /api/users/:id/children - link parent `:id` to a student.
pub async fn link_child(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<LinkChildRequest>,
) -> ApiResult<(StatusCode, Json<ParentLink>)> {
    let parent_id: UserId = parse_id(&id)?;
    let link = services
        .repos
        .users
        .link_parent_student(&ctx, parent_id, body.student_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /api/me/children - the calling parent's linked students.
pub async fn linked_students(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<UserRecord>>> {
    Ok(Json(services.repos.users.linked_students(&ctx)?.into()))
}
