//! Role -> row-scope dispatch table.
//!
//! Each role has exactly one builder that turns the caller into a [`Reach`]:
//! the set of rows it may observe. Repositories never branch on role
//! themselves; they ask the resolved [`Scope`] whether a row is visible and
//! push that predicate into the store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use learnhub_auth::{AccessError, Actor, AuthContext, Role, require_role, require_tenant_context};
use learnhub_core::{ClassId, CourseId, TenantId, UserId};
use learnhub_learning::{CourseRecord, NoticeRecord, ProgressRecord};

use crate::error::RepoResult;
use crate::store::LmsStore;

/// Tenant the request is running under, cross-checked against the carrier.
pub fn active_tenant(ctx: &AuthContext) -> Result<TenantId, AccessError> {
    let carrier = require_tenant_context()?;
    if carrier.tenant_id() != ctx.tenant_id() {
        debug!(
            carrier = %carrier.tenant_id(),
            context = %ctx.tenant_id(),
            "tenant context does not match carrier"
        );
        return Err(AccessError::TenantMismatch);
    }
    Ok(carrier.tenant_id())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reach {
    /// Every row of the tenant.
    Tenant,
    /// Own courses, their classes, and the students enrolled in those classes.
    Teaching {
        courses: BTreeSet<CourseId>,
        classes: BTreeSet<ClassId>,
        students: BTreeSet<UserId>,
    },
    /// Rows reachable through the class membership of `students`
    /// (the caller itself, or a parent's linked children).
    Enrolled {
        classes: BTreeSet<ClassId>,
        students: BTreeSet<UserId>,
    },
}

type ScopeBuilder = fn(&LmsStore, TenantId, Actor) -> RepoResult<Reach>;

const SCOPE_TABLE: [(Role, ScopeBuilder); 4] = [
    (Role::Admin, admin_reach),
    (Role::Teacher, teacher_reach),
    (Role::Student, student_reach),
    (Role::Parent, parent_reach),
];

fn builder_for(role: Role) -> Result<ScopeBuilder, AccessError> {
    SCOPE_TABLE
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, b)| *b)
        .ok_or_else(|| AccessError::InvalidRole(role.to_string()))
}

fn admin_reach(_: &LmsStore, _: TenantId, _: Actor) -> RepoResult<Reach> {
    Ok(Reach::Tenant)
}

fn teacher_reach(store: &LmsStore, tenant_id: TenantId, actor: Actor) -> RepoResult<Reach> {
    let own = store
        .courses
        .filter(tenant_id, &|c| c.is_taught_by(actor.user_id))?;
    let courses = own.iter().map(|c| c.id).collect();
    let classes: BTreeSet<ClassId> = own.iter().map(|c| c.class_id).collect();
    let students = store
        .student_profiles
        .filter(tenant_id, &|p| classes.contains(&p.class_id))?
        .into_iter()
        .map(|p| p.user_id)
        .collect();
    Ok(Reach::Teaching {
        courses,
        classes,
        students,
    })
}

fn student_reach(store: &LmsStore, tenant_id: TenantId, actor: Actor) -> RepoResult<Reach> {
    // No profile means no enrollment: an empty class set, not an error.
    let classes = store
        .student_profiles
        .get(tenant_id, &actor.user_id)?
        .map(|p| p.class_id)
        .into_iter()
        .collect();
    Ok(Reach::Enrolled {
        classes,
        students: BTreeSet::from([actor.user_id]),
    })
}

fn parent_reach(store: &LmsStore, tenant_id: TenantId, actor: Actor) -> RepoResult<Reach> {
    let students: BTreeSet<UserId> = store
        .parent_links
        .filter(tenant_id, &|l| l.parent_id == actor.user_id)?
        .into_iter()
        .map(|l| l.student_id)
        .collect();
    let classes = store
        .student_profiles
        .filter(tenant_id, &|p| students.contains(&p.user_id))?
        .into_iter()
        .map(|p| p.class_id)
        .collect();
    Ok(Reach::Enrolled { classes, students })
}

/// A caller resolved against the dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub tenant_id: TenantId,
    pub actor: Actor,
    pub reach: Reach,
}

impl Scope {
    /// Guard the role, check the tenant, then build the caller's reach.
    pub fn resolve(store: &LmsStore, ctx: &AuthContext, allowed: &[Role]) -> RepoResult<Self> {
        let actor = require_role(ctx, allowed)?;
        let tenant_id = active_tenant(ctx)?;
        let reach = builder_for(actor.role)?(store, tenant_id, actor)?;
        Ok(Self {
            tenant_id,
            actor,
            reach,
        })
    }

    /// Staff see answer keys and other authoring detail.
    pub fn is_staff(&self) -> bool {
        matches!(self.actor.role, Role::Admin | Role::Teacher)
    }

    pub fn sees_course(&self, course: &CourseRecord) -> bool {
        match &self.reach {
            Reach::Tenant => true,
            Reach::Teaching { courses, .. } => courses.contains(&course.id),
            Reach::Enrolled { classes, .. } => classes.contains(&course.class_id),
        }
    }

    pub fn sees_student(&self, student_id: UserId) -> bool {
        match &self.reach {
            Reach::Tenant => true,
            Reach::Teaching { students, .. } | Reach::Enrolled { students, .. } => {
                students.contains(&student_id)
            }
        }
    }

    pub fn sees_user(&self, user_id: UserId) -> bool {
        user_id == self.actor.user_id || self.sees_student(user_id)
    }

    pub fn sees_progress(&self, progress: &ProgressRecord) -> bool {
        match &self.reach {
            Reach::Tenant => true,
            Reach::Teaching { courses, .. } => courses.contains(&progress.course_id),
            Reach::Enrolled { students, .. } => students.contains(&progress.student_id),
        }
    }

    /// Tenant reach sees every notice. Otherwise a notice must be active and
    /// targeted at the caller's role; teaching reach also sees its own drafts
    /// and expired notices.
    pub fn sees_notice(&self, notice: &NoticeRecord, now: DateTime<Utc>) -> bool {
        let targeted = notice.targets(self.actor.role) && notice.is_active(now);
        match &self.reach {
            Reach::Tenant => true,
            Reach::Teaching { .. } => targeted || notice.is_authored_by(self.actor.user_id),
            Reach::Enrolled { .. } => targeted,
        }
    }

    pub fn visible_courses(&self, store: &LmsStore) -> RepoResult<Vec<CourseRecord>> {
        Ok(store.courses.filter(self.tenant_id, &|c| self.sees_course(c))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use learnhub_core::SubjectId;
    use learnhub_learning::{NewCourse, ParentLink, StudentProfile};

    #[test]
    fn every_role_has_exactly_one_builder() {
        for role in Role::ALL {
            assert_eq!(SCOPE_TABLE.iter().filter(|(r, _)| *r == role).count(), 1);
        }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: UserId::new(),
            role,
        }
    }

    fn course(store: &LmsStore, tenant: TenantId, teacher: UserId, class: ClassId) -> CourseRecord {
        let c = NewCourse {
            title: "Algebra".into(),
            description: String::new(),
            class_id: class,
            subject_id: SubjectId::new(),
        }
        .into_record(tenant, teacher, Utc::now())
        .unwrap();
        store.courses.insert(tenant, c.id, c.clone()).unwrap();
        c
    }

    fn enroll(store: &LmsStore, tenant: TenantId, student: UserId, class: ClassId) {
        let profile = StudentProfile {
            user_id: student,
            tenant_id: tenant,
            class_id: class,
            section_id: None,
        };
        store.student_profiles.insert(tenant, student, profile).unwrap();
    }

    #[test]
    fn student_without_profile_reaches_nothing() {
        let store = LmsStore::in_memory();
        let tenant = TenantId::new();
        course(&store, tenant, UserId::new(), ClassId::new());

        let reach = student_reach(&store, tenant, actor(Role::Student)).unwrap();
        let Reach::Enrolled { classes, .. } = reach else {
            panic!("student reach must be class-based");
        };
        assert!(classes.is_empty());
    }

    #[test]
    fn teacher_reaches_students_of_own_classes_only() {
        let store = LmsStore::in_memory();
        let tenant = TenantId::new();
        let teacher = actor(Role::Teacher);
        let mine = ClassId::new();
        let other = ClassId::new();
        let own = course(&store, tenant, teacher.user_id, mine);
        course(&store, tenant, UserId::new(), other);

        let in_class = UserId::new();
        let elsewhere = UserId::new();
        enroll(&store, tenant, in_class, mine);
        enroll(&store, tenant, elsewhere, other);

        let scope = Scope {
            tenant_id: tenant,
            actor: teacher,
            reach: teacher_reach(&store, tenant, teacher).unwrap(),
        };
        assert!(scope.sees_course(&own));
        assert!(scope.sees_student(in_class));
        assert!(!scope.sees_student(elsewhere));
        assert_eq!(scope.visible_courses(&store).unwrap().len(), 1);
    }

    #[test]
    fn notice_visibility_follows_reach() {
        let tenant = TenantId::new();
        let now = Utc::now();
        let teacher = actor(Role::Teacher);
        let notice = |author: UserId, targets: Vec<Role>| {
            learnhub_learning::NewNotice {
                title: "Sports day".into(),
                content: "Bring water".into(),
                category: learnhub_learning::NoticeCategory::Event,
                target_roles: targets,
                published_at: None,
                expires_at: None,
            }
            .into_record(tenant, author, now)
            .unwrap()
        };
        let for_parents = notice(UserId::new(), vec![Role::Parent]);
        let own_for_parents = notice(teacher.user_id, vec![Role::Parent]);
        let for_everyone = notice(UserId::new(), Vec::new());

        let admin = Scope {
            tenant_id: tenant,
            actor: actor(Role::Admin),
            reach: Reach::Tenant,
        };
        let teaching = Scope {
            tenant_id: tenant,
            actor: teacher,
            reach: Reach::Teaching {
                courses: BTreeSet::new(),
                classes: BTreeSet::new(),
                students: BTreeSet::new(),
            },
        };
        let student = Scope {
            tenant_id: tenant,
            actor: actor(Role::Student),
            reach: Reach::Enrolled {
                classes: BTreeSet::new(),
                students: BTreeSet::new(),
            },
        };

        assert!(admin.sees_notice(&for_parents, now));
        assert!(!teaching.sees_notice(&for_parents, now));
        assert!(teaching.sees_notice(&own_for_parents, now));
        assert!(teaching.sees_notice(&for_everyone, now));
        assert!(!student.sees_notice(&for_parents, now));
        assert!(student.sees_notice(&for_everyone, now));
    }

    #[test]
    fn parent_reaches_linked_children() {
        let store = LmsStore::in_memory();
        let tenant = TenantId::new();
        let parent = actor(Role::Parent);
        let child = UserId::new();
        let class = ClassId::new();
        enroll(&store, tenant, child, class);
        let link = ParentLink {
            tenant_id: tenant,
            parent_id: parent.user_id,
            student_id: child,
            linked_at: Utc::now(),
        };
        store
            .parent_links
            .insert(tenant, (parent.user_id, child), link)
            .unwrap();

        let reach = parent_reach(&store, tenant, parent).unwrap();
        assert_eq!(
            reach,
            Reach::Enrolled {
                classes: BTreeSet::from([class]),
                students: BTreeSet::from([child]),
            }
        );
    }
}
