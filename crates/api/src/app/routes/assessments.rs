use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};

use learnhub_auth::AuthContext;
use learnhub_core::AssessmentId;
use learnhub_learning::{AssessmentView, AttemptView, NewAssessment, SubmissionRecord};

use crate::app::dto::{CourseFilterQuery, Items, StudentFilterQuery, SubmitAnswersRequest};
use crate::app::errors::{ApiResult, parse_id};
use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_assessments).post(create_assessment))
        .route("/:id", get(get_assessment))
        .route("/:id/attempt", get(get_attempt))
        .route("/:id/submit", post(submit_assessment))
        .route("/:id/submissions", get(list_submissions))
}

pub async fn create_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(body): ApiJson<NewAssessment>,
) -> ApiResult<(StatusCode, Json<AssessmentView>)> {
    let view = services.repos.assessments.create_assessment(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_assessments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<CourseFilterQuery>,
) -> ApiResult<Json<Items<AssessmentView>>> {
    let views = services.repos.assessments.list_assessments(&ctx, query.course_id)?;
    Ok(Json(views.into()))
}

pub async fn get_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssessmentView>> {
    let assessment_id: AssessmentId = parse_id(&id)?;
    Ok(Json(services.repos.assessments.get_assessment(&ctx, assessment_id)?))
}

pub async fn get_attempt(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<AttemptView>> {
    let assessment_id: AssessmentId = parse_id(&id)?;
    Ok(Json(
        services
            .repos
            .assessments
            .get_assessment_for_attempt(&ctx, assessment_id)?,
    ))
}

/// POST /api/assessments/:id/submit - the single graded attempt.
pub async fn submit_assessment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SubmitAnswersRequest>,
) -> ApiResult<(StatusCode, Json<SubmissionRecord>)> {
    let assessment_id: AssessmentId = parse_id(&id)?;
    let submission = services
        .repos
        .assessments
        .submit_assessment(&ctx, assessment_id, body.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_submissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Items<SubmissionRecord>>> {
    let assessment_id: AssessmentId = parse_id(&id)?;
    let submissions = services
        .repos
        .assessments
        .list_submissions(&ctx, assessment_id)?;
    Ok(Json(submissions.into()))
}

/// GET /api/submissions - own (STUDENT) or children's (PARENT) submissions.
pub async fn my_submissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<StudentFilterQuery>,
) -> ApiResult<Json<Items<SubmissionRecord>>> {
    let submissions = services
        .repos
        .assessments
        .my_submissions(&ctx, query.student_id)?;
    Ok(Json(submissions.into()))
}
