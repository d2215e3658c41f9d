use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    routing::get,
};

use learnhub_auth::AuthContext;
use learnhub_learning::{ClassRecord, ClassSubjectRecord, SubjectRecord};

use crate::app::dto::{ClassFilterQuery, Items, MapClassSubjectRequest, NameRequest};
use crate::app::errors::ApiResult;
use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/classes", get(list_classes).post(create_class))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/class-subjects", get(list_class_subjects).post(map_class_subject))
}

pub async fn create_class(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<ClassRecord>)> {
    let class = services.repos.structure.create_class(&ctx, &body.name).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn list_classes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<ClassRecord>>> {
    Ok(Json(services.repos.structure.list_classes(&ctx)?.into()))
}

pub async fn create_subject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<SubjectRecord>)> {
    let subject = services.repos.structure.create_subject(&ctx, &body.name).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn list_subjects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Items<SubjectRecord>>> {
    Ok(Json(services.repos.structure.list_subjects(&ctx)?.into()))
}

pub async fn map_class_subject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<MapClassSubjectRequest>,
) -> ApiResult<(StatusCode, Json<ClassSubjectRecord>)> {
    let mapping = services
        .repos
        .structure
        .map_class_subject(&ctx, body.class_id, body.subject_id)
        .await?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn list_class_subjects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<ClassFilterQuery>,
) -> ApiResult<Json<Items<ClassSubjectRecord>>> {
    let mappings = services.repos.structure.list_class_subjects(&ctx, query.class_id)?;
    Ok(Json(mappings.into()))
}
