use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AuthContext, Role, require_student, require_teacher};
use learnhub_core::{AssessmentId, CourseId, UserId};
use learnhub_learning::{
    AssessmentRecord, AssessmentView, AttemptState, AttemptView, NewAssessment, SubmissionRecord,
};

use super::audit_params;
use crate::error::{RepoError, RepoResult, conflict_as};
use crate::ownership::{require_student_enrollment, require_teacher_course_access};
use crate::scope::{Scope, active_tenant};
use crate::store::LmsStore;

const ALREADY_SUBMITTED: &str = "assessment has already been submitted";

/// A failed course relationship is reported against the assessment the
/// caller asked for.
fn hide_as_assessment(err: RepoError) -> RepoError {
    match err {
        RepoError::Access(_) => RepoError::not_found("assessment"),
        other => other,
    }
}

/// Assessments, attempts and submissions.
///
/// A submission is keyed by (assessment, student) in storage; the insert is
/// the single-attempt guarantee. The read before it only produces a nicer
/// error earlier.
#[derive(Debug, Clone)]
pub struct AssessmentRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

impl AssessmentRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    fn view_for(scope: &Scope, assessment: &AssessmentRecord) -> AssessmentView {
        if scope.is_staff() {
            assessment.staff_view()
        } else {
            assessment.redacted_view()
        }
    }

    /// TEACHER owner of the target course.
    pub async fn create_assessment(
        &self,
        ctx: &AuthContext,
        input: NewAssessment,
    ) -> RepoResult<AssessmentView> {
        let (actor, course) = require_teacher_course_access(&self.store, ctx, input.course_id)?;
        let tenant_id = course.tenant_id;

        let assessment = input.into_record(tenant_id, actor.user_id, Utc::now())?;
        self.store
            .assessments
            .insert(tenant_id, assessment.id, assessment.clone())?;

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Create, "assessment")
                    .resource_id(assessment.id)
                    .metadata(json!({
                        "courseId": course.id,
                        "questionCount": assessment.question_count(),
                    })),
            )
            .await;
        Ok(assessment.staff_view())
    }

    /// Assessments of every course the caller can see, optionally narrowed
    /// to one course.
    pub fn list_assessments(
        &self,
        ctx: &AuthContext,
        course_id: Option<CourseId>,
    ) -> RepoResult<Vec<AssessmentView>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let courses: BTreeSet<CourseId> = scope
            .visible_courses(&self.store)?
            .into_iter()
            .map(|c| c.id)
            .filter(|id| course_id.is_none_or(|wanted| wanted == *id))
            .collect();

        let mut assessments = self
            .store
            .assessments
            .filter(scope.tenant_id, &|a| courses.contains(&a.course_id))?;
        assessments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(assessments.iter().map(|a| Self::view_for(&scope, a)).collect())
    }

    /// Role-aware single fetch; the answer key is only included for staff.
    pub fn get_assessment(
        &self,
        ctx: &AuthContext,
        assessment_id: AssessmentId,
    ) -> RepoResult<AssessmentView> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let assessment = self
            .store
            .assessments
            .get(scope.tenant_id, &assessment_id)?
            .ok_or_else(|| RepoError::not_found("assessment"))?;
        let visible = self
            .store
            .courses
            .get(scope.tenant_id, &assessment.course_id)?
            .is_some_and(|c| scope.sees_course(&c));
        if !visible {
            return Err(RepoError::not_found("assessment"));
        }
        Ok(Self::view_for(&scope, &assessment))
    }

    fn load_for_student(
        &self,
        ctx: &AuthContext,
        assessment_id: AssessmentId,
    ) -> RepoResult<AssessmentRecord> {
        require_student(ctx)?;
        let tenant_id = active_tenant(ctx)?;
        let assessment = self
            .store
            .assessments
            .get(tenant_id, &assessment_id)?
            .ok_or_else(|| RepoError::not_found("assessment"))?;
        require_student_enrollment(&self.store, ctx, assessment.course_id)
            .map_err(hide_as_assessment)?;
        Ok(assessment)
    }

    /// STUDENT: the assessment without answers plus the caller's attempt state.
    pub fn get_assessment_for_attempt(
        &self,
        ctx: &AuthContext,
        assessment_id: AssessmentId,
    ) -> RepoResult<AttemptView> {
        let assessment = self.load_for_student(ctx, assessment_id)?;
        let student_id = require_student(ctx)?.user_id;
        let submission = self
            .store
            .submissions
            .get(assessment.tenant_id, &(assessment.id, student_id))?;
        Ok(assessment.attempt_view(submission.as_ref()))
    }

    /// STUDENT: the one and only attempt, graded on the spot.
    pub async fn submit_assessment(
        &self,
        ctx: &AuthContext,
        assessment_id: AssessmentId,
        answers: Vec<i64>,
    ) -> RepoResult<SubmissionRecord> {
        let actor = require_student(ctx)?;
        let assessment = self.load_for_student(ctx, assessment_id)?;
        let tenant_id = assessment.tenant_id;
        let key = (assessment.id, actor.user_id);

        let existing = self.store.submissions.get(tenant_id, &key)?;
        let submission = SubmissionRecord::submit(
            &assessment,
            actor.user_id,
            answers,
            AttemptState::of(existing.as_ref()),
            Utc::now(),
        )?;

        self.store
            .submissions
            .insert(tenant_id, key, submission.clone())
            .map_err(conflict_as(ALREADY_SUBMITTED))?;

        info!(
            tenant_id = %tenant_id,
            assessment_id = %assessment.id,
            student_id = %actor.user_id,
            score = submission.score,
            "assessment submitted"
        );
        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Submit, "submission")
                    .resource_id(submission.id)
                    .metadata(json!({
                        "assessmentId": assessment.id,
                        "score": submission.score,
                        "maxScore": submission.max_score,
                    })),
            )
            .await;
        Ok(submission)
    }

    /// TEACHER owner: every submission for the assessment.
    pub fn list_submissions(
        &self,
        ctx: &AuthContext,
        assessment_id: AssessmentId,
    ) -> RepoResult<Vec<SubmissionRecord>> {
        require_teacher(ctx)?;
        let tenant_id = active_tenant(ctx)?;
        let assessment = self
            .store
            .assessments
            .get(tenant_id, &assessment_id)?
            .ok_or_else(|| RepoError::not_found("assessment"))?;
        require_teacher_course_access(&self.store, ctx, assessment.course_id)
            .map_err(hide_as_assessment)?;

        let mut submissions = self
            .store
            .submissions
            .filter(tenant_id, &|s| s.assessment_id == assessment.id)?;
        submissions.sort_by_key(|s| s.submitted_at);
        Ok(submissions)
    }

    /// STUDENT: own submissions. PARENT: linked children's submissions.
    pub fn my_submissions(
        &self,
        ctx: &AuthContext,
        student_id: Option<UserId>,
    ) -> RepoResult<Vec<SubmissionRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &[Role::Student, Role::Parent])?;
        if let Some(student_id) = student_id {
            if !scope.sees_student(student_id) {
                return Err(RepoError::not_found("student"));
            }
        }

        let mut submissions = self.store.submissions.filter(scope.tenant_id, &|s| {
            scope.sees_student(s.student_id) && student_id.is_none_or(|id| id == s.student_id)
        })?;
        submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(submissions)
    }
}
