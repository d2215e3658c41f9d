//! Request bodies, query strings and list envelopes.
//!
//! Domain inputs (`NewCourse`, `NewAssessment`, `NewNotice`, ...) are
//! deserialized directly; only shapes the domain has no type for live here.

use serde::{Deserialize, Serialize};

use learnhub_audit::AuditFilter;
use learnhub_core::{ClassId, CourseId, LessonId, SubjectId, UserId};
use learnhub_learning::ProgressStatus;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapClassSubjectRequest {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub lesson_id: LessonId,
    pub status: ProgressStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileRequest {
    pub class_id: ClassId,
    #[serde(default)]
    pub section_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChildRequest {
    pub student_id: UserId,
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFilterQuery {
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilterQuery {
    pub course_id: Option<CourseId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilterQuery {
    pub student_id: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub student_id: Option<UserId>,
    pub course_id: Option<CourseId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub actor_id: Option<UserId>,
    pub resource_type: Option<String>,
    pub action_type: Option<String>,
    pub limit: Option<usize>,
}

impl From<AuditLogQuery> for AuditFilter {
    fn from(q: AuditLogQuery) -> Self {
        let defaults = AuditFilter::default();
        AuditFilter {
            actor_id: q.actor_id,
            resource_type: q.resource_type,
            action_type: q.action_type.map(|a| a.trim().to_ascii_uppercase()),
            limit: q.limit.unwrap_or(defaults.limit),
        }
    }
}

// -------------------------
// Response envelopes
// -------------------------

/// `{"items": [...]}`
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}
