use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AccessError, Actor, AuthContext, Role, require_parent, require_session};
use learnhub_core::{ClassId, DomainError, TenantId, UserId};
use learnhub_learning::{ParentLink, StudentProfile, UserRecord};

use super::audit_params;
use crate::error::{RepoError, RepoResult, conflict_as};
use crate::ownership::require_admin_tenant_scope;
use crate::scope::{Scope, active_tenant};
use crate::store::{LmsStore, StoreError, modify};

/// Users, onboarding, student profiles and parent links.
#[derive(Debug, Clone)]
pub struct UserRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

fn keep_existing(existing: UserRecord, requested: Role) -> RepoResult<UserRecord> {
    if existing.role == requested {
        Ok(existing)
    } else {
        Err(DomainError::conflict(format!("user already holds role {}", existing.role)).into())
    }
}

impl UserRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    /// Domain user for an identity-provider subject, if onboarded.
    pub fn find_by_subject(&self, tenant_id: TenantId, subject: &str) -> RepoResult<Option<UserRecord>> {
        let found = self
            .store
            .users
            .filter(tenant_id, &|u| u.auth_subject == subject)?;
        Ok(found.into_iter().next())
    }

    /// Onboarding: create the caller's user with `requested` as its role.
    ///
    /// Idempotent for the same role. `ADMIN` can only be self-assigned while
    /// the tenant has no administrator.
    pub async fn assign_role(&self, ctx: &AuthContext, requested: &str) -> RepoResult<UserRecord> {
        let session = require_session(ctx)?;
        let tenant_id = active_tenant(ctx)?;
        let role = Role::parse(requested)
            .ok_or_else(|| AccessError::InvalidRole(requested.trim().to_string()))?;

        if let Some(existing) = self.find_by_subject(tenant_id, &session.subject)? {
            return keep_existing(existing, role);
        }

        let record = UserRecord {
            id: UserId::new(),
            tenant_id,
            auth_subject: session.subject.clone(),
            name: session.name.clone(),
            email: session.email.clone(),
            avatar: session.avatar.clone(),
            role,
            created_at: Utc::now(),
        };

        let subject = session.subject.as_str();
        let inserted = self.store.users.insert_unique(
            tenant_id,
            record.id,
            record.clone(),
            &|u| u.auth_subject == subject || (role == Role::Admin && u.role == Role::Admin),
        );
        match inserted {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                // Either a concurrent onboarding of the same subject won, or
                // the tenant already has its administrator.
                if let Some(existing) = self.find_by_subject(tenant_id, subject)? {
                    return keep_existing(existing, role);
                }
                return Err(AccessError::forbidden("tenant already has an administrator").into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(tenant_id = %tenant_id, user_id = %record.id, role = %role, "user onboarded");
        let actor = Actor {
            user_id: record.id,
            role,
        };
        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::AssignRole, "user")
                    .resource_id(record.id)
                    .metadata(json!({ "role": role.as_str() })),
            )
            .await;
        Ok(record)
    }

    /// ADMIN: every user. TEACHER: self and students of own classes.
    /// STUDENT: self. PARENT: self and linked children.
    pub fn list_users(&self, ctx: &AuthContext) -> RepoResult<Vec<UserRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let mut users = self
            .store
            .users
            .filter(scope.tenant_id, &|u| scope.sees_user(u.id))?;
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    pub fn get_user(&self, ctx: &AuthContext, user_id: UserId) -> RepoResult<UserRecord> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        match self.store.users.get(scope.tenant_id, &user_id)? {
            Some(user) if scope.sees_user(user.id) => Ok(user),
            _ => Err(RepoError::not_found("user")),
        }
    }

    /// ADMIN: place a student in a class (creates or replaces the profile).
    pub async fn assign_student_class(
        &self,
        ctx: &AuthContext,
        student_id: UserId,
        class_id: ClassId,
        section_id: Option<String>,
    ) -> RepoResult<StudentProfile> {
        let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;

        let student = self
            .store
            .users
            .get(tenant_id, &student_id)?
            .ok_or_else(|| RepoError::not_found("user"))?;
        if student.role != Role::Student {
            return Err(DomainError::validation("user is not a student").into());
        }
        if self.store.classes.get(tenant_id, &class_id)?.is_none() {
            return Err(RepoError::not_found("class"));
        }

        let profile = StudentProfile {
            user_id: student_id,
            tenant_id,
            class_id,
            section_id: section_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        };
        modify(&*self.store.student_profiles, tenant_id, &student_id, |_| {
            Ok::<_, RepoError>(Some(profile.clone()))
        })?;

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Update, "student_profile")
                    .resource_id(student_id)
                    .metadata(json!({ "classId": class_id })),
            )
            .await;
        Ok(profile)
    }

    /// ADMIN: link a parent to a student.
    pub async fn link_parent_student(
        &self,
        ctx: &AuthContext,
        parent_id: UserId,
        student_id: UserId,
    ) -> RepoResult<ParentLink> {
        let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;

        let parent = self.store.users.get(tenant_id, &parent_id)?;
        let student = self.store.users.get(tenant_id, &student_id)?;
        let (Some(parent), Some(student)) = (parent, student) else {
            return Err(RepoError::not_found("user"));
        };
        if parent.role != Role::Parent {
            return Err(DomainError::validation("user is not a parent").into());
        }
        if student.role != Role::Student {
            return Err(DomainError::validation("user is not a student").into());
        }

        let link = ParentLink {
            tenant_id,
            parent_id,
            student_id,
            linked_at: Utc::now(),
        };
        self.store
            .parent_links
            .insert(tenant_id, (parent_id, student_id), link.clone())
            .map_err(conflict_as("parent is already linked to this student"))?;

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Link, "parent_link")
                    .resource_id(format!("{parent_id}:{student_id}")),
            )
            .await;
        Ok(link)
    }

    /// PARENT: own linked children.
    pub fn linked_students(&self, ctx: &AuthContext) -> RepoResult<Vec<UserRecord>> {
        let actor = require_parent(ctx)?;
        let tenant_id = active_tenant(ctx)?;
        let children: BTreeSet<UserId> = self
            .store
            .parent_links
            .filter(tenant_id, &|l| l.parent_id == actor.user_id)?
            .into_iter()
            .map(|l| l.student_id)
            .collect();
        let mut users = self
            .store
            .users
            .filter(tenant_id, &|u| children.contains(&u.id))?;
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}
