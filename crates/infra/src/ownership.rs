//! Relationship checks for single-resource access.
//!
//! Every check has the same shape: the role is guarded first (a categorically
//! wrong role is `Forbidden`), then the relationship is resolved. A missing
//! relationship yields `ResourceNotFound`, exactly as if the row did not exist.

use tracing::debug;

use learnhub_auth::{
    Actor, AuthContext, Role, require_admin, require_parent, require_role, require_student,
    require_teacher,
};
use learnhub_core::{CourseId, NoticeId, TenantId, UserId};
use learnhub_learning::{CourseRecord, NoticeRecord, UserRecord};

use crate::error::{RepoError, RepoResult};
use crate::scope::{Scope, active_tenant};
use crate::store::LmsStore;

fn hidden(resource: &'static str, tenant_id: TenantId, actor: &Actor) -> RepoError {
    debug!(tenant_id = %tenant_id, actor_id = %actor.user_id, role = %actor.role, resource, "relationship check failed");
    RepoError::not_found(resource)
}

/// TEACHER who owns the course.
pub fn require_teacher_course_access(
    store: &LmsStore,
    ctx: &AuthContext,
    course_id: CourseId,
) -> RepoResult<(Actor, CourseRecord)> {
    let actor = require_teacher(ctx)?;
    let tenant_id = active_tenant(ctx)?;
    match store.courses.get(tenant_id, &course_id)? {
        Some(course) if course.is_taught_by(actor.user_id) => Ok((actor, course)),
        _ => Err(hidden("course", tenant_id, &actor)),
    }
}

/// STUDENT whose profile class matches the course's class.
pub fn require_student_enrollment(
    store: &LmsStore,
    ctx: &AuthContext,
    course_id: CourseId,
) -> RepoResult<(Actor, CourseRecord)> {
    let actor = require_student(ctx)?;
    let tenant_id = active_tenant(ctx)?;
    let course = store.courses.get(tenant_id, &course_id)?;
    let profile = store.student_profiles.get(tenant_id, &actor.user_id)?;
    match (course, profile) {
        (Some(course), Some(profile)) if profile.class_id == course.class_id => Ok((actor, course)),
        _ => Err(hidden("course", tenant_id, &actor)),
    }
}

/// PARENT linked to the student.
pub fn require_parent_student_link(
    store: &LmsStore,
    ctx: &AuthContext,
    student_id: UserId,
) -> RepoResult<(Actor, UserRecord)> {
    let actor = require_parent(ctx)?;
    let tenant_id = active_tenant(ctx)?;
    let linked = store
        .parent_links
        .get(tenant_id, &(actor.user_id, student_id))?
        .is_some();
    match store.users.get(tenant_id, &student_id)? {
        Some(student) if linked => Ok((actor, student)),
        _ => Err(hidden("student", tenant_id, &actor)),
    }
}

/// ADMIN acting inside the tenant the request resolved to.
pub fn require_admin_tenant_scope(ctx: &AuthContext) -> RepoResult<(Actor, TenantId)> {
    let actor = require_admin(ctx)?;
    let tenant_id = active_tenant(ctx)?;
    Ok((actor, tenant_id))
}

/// Roles that may write notices.
pub const NOTICE_AUTHORS: [Role; 2] = [Role::Admin, Role::Teacher];

/// Editor of one notice: ADMIN any notice of the tenant, TEACHER own notices.
pub fn require_notice_author(
    store: &LmsStore,
    ctx: &AuthContext,
    notice_id: NoticeId,
) -> RepoResult<(Actor, NoticeRecord)> {
    let actor = require_role(ctx, &NOTICE_AUTHORS)?;
    match actor.role {
        Role::Admin => {
            let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;
            match store.notices.get(tenant_id, &notice_id)? {
                Some(notice) => Ok((actor, notice)),
                None => Err(hidden("notice", tenant_id, &actor)),
            }
        }
        _ => {
            let actor = require_teacher(ctx)?;
            let tenant_id = active_tenant(ctx)?;
            match store.notices.get(tenant_id, &notice_id)? {
                Some(notice) if notice.is_authored_by(actor.user_id) => Ok((actor, notice)),
                _ => Err(hidden("notice", tenant_id, &actor)),
            }
        }
    }
}

/// Any role reading one student's data, dispatched on the caller's role:
/// ADMIN any student of the tenant, TEACHER students of own classes, STUDENT
/// self, PARENT linked children.
pub fn require_student_data_access(
    store: &LmsStore,
    ctx: &AuthContext,
    student_id: UserId,
) -> RepoResult<Actor> {
    let actor = require_role(ctx, &Role::ALL)?;
    match actor.role {
        Role::Parent => require_parent_student_link(store, ctx, student_id).map(|(a, _)| a),
        Role::Student => {
            let tenant_id = active_tenant(ctx)?;
            if student_id == actor.user_id {
                Ok(actor)
            } else {
                Err(hidden("student", tenant_id, &actor))
            }
        }
        Role::Admin | Role::Teacher => {
            let scope = Scope::resolve(store, ctx, &[Role::Admin, Role::Teacher])?;
            let exists = store.users.get(scope.tenant_id, &student_id)?.is_some();
            if exists && scope.sees_student(student_id) {
                Ok(actor)
            } else {
                Err(hidden("student", scope.tenant_id, &actor))
            }
        }
    }
}

/// Any role fetching one course; re-checks the caller's scope on the row.
pub fn require_course_access(
    store: &LmsStore,
    scope: &Scope,
    course_id: CourseId,
) -> RepoResult<CourseRecord> {
    match store.courses.get(scope.tenant_id, &course_id)? {
        Some(course) if scope.sees_course(&course) => Ok(course),
        _ => Err(hidden("course", scope.tenant_id, &scope.actor)),
    }
}
