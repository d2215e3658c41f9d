use std::sync::Arc;

use chrono::Utc;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AuthContext, Role, require_role};
use learnhub_core::{ClassId, SubjectId, TenantId};
use learnhub_learning::{ClassRecord, ClassSubjectRecord, SubjectRecord};

use super::audit_params;
use crate::error::{RepoError, RepoResult, conflict_as};
use crate::ownership::require_admin_tenant_scope;
use crate::scope::active_tenant;
use crate::store::LmsStore;

/// Classes, subjects and the class <-> subject mapping.
///
/// Names are unique per tenant, compared trimmed and case-insensitively. The
/// check runs inside the same write as the insert.
#[derive(Debug, Clone)]
pub struct StructureRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

impl StructureRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    fn reader_tenant(ctx: &AuthContext) -> RepoResult<TenantId> {
        require_role(ctx, &Role::ALL)?;
        Ok(active_tenant(ctx)?)
    }

    pub async fn create_class(&self, ctx: &AuthContext, name: &str) -> RepoResult<ClassRecord> {
        let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;
        let class = ClassRecord::new(tenant_id, name, Utc::now())?;

        self.store
            .classes
            .insert_unique(tenant_id, class.id, class.clone(), &|c| c.same_name(&class.name))
            .map_err(conflict_as(format!("class '{}' already exists", class.name)))?;

        self.audit
            .log(audit_params(ctx, tenant_id, &actor, AuditAction::Create, "class").resource_id(class.id))
            .await;
        Ok(class)
    }

    pub async fn create_subject(&self, ctx: &AuthContext, name: &str) -> RepoResult<SubjectRecord> {
        let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;
        let subject = SubjectRecord::new(tenant_id, name, Utc::now())?;

        self.store
            .subjects
            .insert_unique(tenant_id, subject.id, subject.clone(), &|s| s.same_name(&subject.name))
            .map_err(conflict_as(format!("subject '{}' already exists", subject.name)))?;

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Create, "subject")
                    .resource_id(subject.id),
            )
            .await;
        Ok(subject)
    }

    pub async fn map_class_subject(
        &self,
        ctx: &AuthContext,
        class_id: ClassId,
        subject_id: SubjectId,
    ) -> RepoResult<ClassSubjectRecord> {
        let (actor, tenant_id) = require_admin_tenant_scope(ctx)?;
        if self.store.classes.get(tenant_id, &class_id)?.is_none() {
            return Err(RepoError::not_found("class"));
        }
        if self.store.subjects.get(tenant_id, &subject_id)?.is_none() {
            return Err(RepoError::not_found("subject"));
        }

        let mapping = ClassSubjectRecord::new(tenant_id, class_id, subject_id);
        self.store
            .class_subjects
            .insert(tenant_id, (class_id, subject_id), mapping.clone())
            .map_err(conflict_as("subject is already mapped to this class"))?;

        self.audit
            .log(
                audit_params(ctx, tenant_id, &actor, AuditAction::Create, "class_subject")
                    .resource_id(mapping.id),
            )
            .await;
        Ok(mapping)
    }

    pub fn list_classes(&self, ctx: &AuthContext) -> RepoResult<Vec<ClassRecord>> {
        let tenant_id = Self::reader_tenant(ctx)?;
        let mut classes = self.store.classes.list(tenant_id)?;
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    pub fn list_subjects(&self, ctx: &AuthContext) -> RepoResult<Vec<SubjectRecord>> {
        let tenant_id = Self::reader_tenant(ctx)?;
        let mut subjects = self.store.subjects.list(tenant_id)?;
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    /// Mappings, optionally for one class.
    pub fn list_class_subjects(
        &self,
        ctx: &AuthContext,
        class_id: Option<ClassId>,
    ) -> RepoResult<Vec<ClassSubjectRecord>> {
        let tenant_id = Self::reader_tenant(ctx)?;
        let mut mappings = self
            .store
            .class_subjects
            .filter(tenant_id, &|m| class_id.is_none_or(|c| c == m.class_id))?;
        mappings.sort_by_key(|m| (m.class_id, m.subject_id));
        Ok(mappings)
    }
}
