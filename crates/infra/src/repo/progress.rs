use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AuthContext, Role, require_role, require_student};
use learnhub_core::{AssessmentId, CourseId, LessonId, UserId};
use learnhub_learning::{ProgressRecord, ProgressStatus, Transition};

use super::audit_params;
use crate::error::{RepoError, RepoResult};
use crate::ownership::{
    require_admin_tenant_scope, require_student_data_access, require_student_enrollment,
    require_teacher_course_access,
};
use crate::scope::{Scope, active_tenant};
use crate::store::{LmsStore, StoreError, modify};

/// Per-course aggregate for staff.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnalytics {
    pub course_id: CourseId,
    pub lesson_count: usize,
    pub students_tracked: usize,
    pub lessons_completed: usize,
    pub lessons_in_progress: usize,
    pub assessment_count: usize,
    pub submission_count: usize,
    /// Mean of `score / maxScore` over all submissions, as a percentage.
    pub average_score_percent: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ProgressRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

impl ProgressRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    /// STUDENT: record progress on a lesson of an enrolled course.
    ///
    /// Upsert keyed by (student, lesson). Moving to a lower status is
    /// rejected and leaves the row as it was; repeating the current status
    /// writes nothing.
    pub async fn update_progress(
        &self,
        ctx: &AuthContext,
        lesson_id: LessonId,
        status: ProgressStatus,
    ) -> RepoResult<ProgressRecord> {
        let actor = require_student(ctx)?;
        let tenant_id = active_tenant(ctx)?;
        let lesson = self
            .store
            .lessons
            .get(tenant_id, &lesson_id)?
            .ok_or_else(|| RepoError::not_found("lesson"))?;
        require_student_enrollment(&self.store, ctx, lesson.course_id).map_err(|e| match e {
            RepoError::Access(_) => RepoError::not_found("lesson"),
            other => other,
        })?;

        let now = Utc::now();
        let mut transition = None;
        let stored = modify(
            &*self.store.progress,
            tenant_id,
            &(actor.user_id, lesson.id),
            |current: Option<&ProgressRecord>| -> RepoResult<Option<ProgressRecord>> {
                match current {
                    None => {
                        transition = Some(Transition::Created(status));
                        Ok(Some(ProgressRecord::start(
                            tenant_id,
                            actor.user_id,
                            lesson.id,
                            lesson.course_id,
                            status,
                            now,
                        )))
                    }
                    Some(current) => {
                        let mut next = current.clone();
                        let t = next.apply(status, now)?;
                        transition = Some(t);
                        Ok(t.is_write().then_some(next))
                    }
                }
            },
        )?
        .ok_or(StoreError::NotFound)?;

        if let Some(t) = transition.filter(|t| t.is_write()) {
            let (action, from) = match t {
                Transition::Advanced { from, .. } => (AuditAction::Update, Some(from)),
                _ => (AuditAction::Create, None),
            };
            self.audit
                .log(
                    audit_params(ctx, tenant_id, &actor, action, "progress")
                        .resource_id(lesson.id)
                        .metadata(json!({ "from": from, "to": t.status() })),
                )
                .await;
        }
        Ok(stored)
    }

    /// Progress rows the caller can see, optionally narrowed to a student
    /// and/or course. Asking for a student outside the caller's reach is
    /// `ResourceNotFound`.
    pub fn get_progress(
        &self,
        ctx: &AuthContext,
        student_id: Option<UserId>,
        course_id: Option<CourseId>,
    ) -> RepoResult<Vec<ProgressRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        if let Some(student_id) = student_id {
            require_student_data_access(&self.store, ctx, student_id)?;
        }

        let mut rows = self.store.progress.filter(scope.tenant_id, &|p| {
            scope.sees_progress(p)
                && student_id.is_none_or(|s| s == p.student_id)
                && course_id.is_none_or(|c| c == p.course_id)
        })?;
        rows.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
        Ok(rows)
    }

    /// ADMIN any course of the tenant; TEACHER own courses only.
    pub fn course_analytics(&self, ctx: &AuthContext, course_id: CourseId) -> RepoResult<CourseAnalytics> {
        let actor = require_role(ctx, &[Role::Admin, Role::Teacher])?;
        let course = match actor.role {
            Role::Teacher => require_teacher_course_access(&self.store, ctx, course_id)?.1,
            _ => {
                let (_, tenant_id) = require_admin_tenant_scope(ctx)?;
                self.store
                    .courses
                    .get(tenant_id, &course_id)?
                    .ok_or_else(|| RepoError::not_found("course"))?
            }
        };
        let tenant_id = course.tenant_id;

        let lesson_count = self
            .store
            .lessons
            .filter(tenant_id, &|l| l.course_id == course.id)?
            .len();
        let progress = self
            .store
            .progress
            .filter(tenant_id, &|p| p.course_id == course.id)?;
        let students: BTreeSet<UserId> = progress.iter().map(|p| p.student_id).collect();
        let count = |status: ProgressStatus| progress.iter().filter(|p| p.status == status).count();

        let assessments: BTreeSet<AssessmentId> = self
            .store
            .assessments
            .filter(tenant_id, &|a| a.course_id == course.id)?
            .into_iter()
            .map(|a| a.id)
            .collect();
        let submissions = self
            .store
            .submissions
            .filter(tenant_id, &|s| assessments.contains(&s.assessment_id))?;
        let average_score_percent = (!submissions.is_empty()).then(|| {
            let total: f64 = submissions
                .iter()
                .map(|s| f64::from(s.score) / f64::from(s.max_score.max(1)))
                .sum();
            total / submissions.len() as f64 * 100.0
        });

        Ok(CourseAnalytics {
            course_id: course.id,
            lesson_count,
            students_tracked: students.len(),
            lessons_completed: count(ProgressStatus::Completed),
            lessons_in_progress: count(ProgressStatus::InProgress),
            assessment_count: assessments.len(),
            submission_count: submissions.len(),
            average_score_percent,
        })
    }
}
