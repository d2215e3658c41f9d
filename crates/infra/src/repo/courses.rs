use std::sync::Arc;

use chrono::Utc;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AuthContext, Role, require_teacher};
use learnhub_core::{CourseId, DomainError};
use learnhub_learning::{CourseRecord, LessonRecord, NewCourse, NewLesson};

use super::audit_params;
use crate::error::{RepoError, RepoResult};
use crate::ownership::{require_course_access, require_teacher_course_access};
use crate::scope::{Scope, active_tenant};
use crate::store::{LmsStore, MAX_MODIFY_ATTEMPTS, StoreError};

#[derive(Debug, Clone)]
pub struct CourseRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

impl CourseRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    /// TEACHER: create a course owned by the caller. The subject must be
    /// mapped to the class.
    pub async fn create_course(&self, ctx: &AuthContext, input: NewCourse) -> RepoResult<CourseRecord> {
        let actor = require_teacher(ctx)?;
        let tenant_id = active_tenant(ctx)?;

        if self.store.classes.get(tenant_id, &input.class_id)?.is_none() {
            return Err(RepoError::not_found("class"));
        }
        if self.store.subjects.get(tenant_id, &input.subject_id)?.is_none() {
            return Err(RepoError::not_found("subject"));
        }
        let mapped = self
            .store
            .class_subjects
            .get(tenant_id, &(input.class_id, input.subject_id))?
            .is_some();
        if !mapped {
            return Err(DomainError::validation("subject is not offered for this class").into());
        }

        let course = input.into_record(tenant_id, actor.user_id, Utc::now())?;
        self.store.courses.insert(tenant_id, course.id, course.clone())?;

        self.audit
            .log(audit_params(ctx, tenant_id, &actor, AuditAction::Create, "course").resource_id(course.id))
            .await;
        Ok(course)
    }

    /// ADMIN: all. TEACHER: own. STUDENT: own class. PARENT: children's classes.
    pub fn list_courses(&self, ctx: &AuthContext) -> RepoResult<Vec<CourseRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let mut courses = scope.visible_courses(&self.store)?;
        courses.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    pub fn get_course_by_id(&self, ctx: &AuthContext, course_id: CourseId) -> RepoResult<CourseRecord> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        require_course_access(&self.store, &scope, course_id)
    }

    /// TEACHER owner: append a lesson at the end of the course.
    pub async fn create_lesson(
        &self,
        ctx: &AuthContext,
        course_id: CourseId,
        input: NewLesson,
    ) -> RepoResult<LessonRecord> {
        let (actor, course) = require_teacher_course_access(&self.store, ctx, course_id)?;
        let tenant_id = course.tenant_id;

        let now = Utc::now();

        // (course, position) is unique; a racing insert takes the next slot.
        let mut attempts = 0;
        let lesson = loop {
            let position = self
                .store
                .lessons
                .filter(tenant_id, &|l| l.course_id == course.id)?
                .len() as u32;
            let lesson = input.clone().into_record(&course, position, now)?;
            let clashes = |l: &LessonRecord| l.course_id == course.id && l.position == position;
            match self
                .store
                .lessons
                .insert_unique(tenant_id, lesson.id, lesson.clone(), &clashes)
            {
                Ok(()) => break lesson,
                Err(StoreError::Conflict(_)) if attempts + 1 < MAX_MODIFY_ATTEMPTS => attempts += 1,
                Err(err) => return Err(err.into()),
            }
        };

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Create, "lesson")
                    .resource_id(lesson.id),
            )
            .await;
        Ok(lesson)
    }

    pub fn list_lessons(&self, ctx: &AuthContext, course_id: CourseId) -> RepoResult<Vec<LessonRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let course = require_course_access(&self.store, &scope, course_id)?;
        let mut lessons = self
            .store
            .lessons
            .filter(scope.tenant_id, &|l| l.course_id == course.id)?;
        lessons.sort_by_key(|l| l.position);
        Ok(lessons)
    }
}
