use std::sync::Arc;

use chrono::Utc;

use learnhub_audit::{AuditAction, AuditLogService};
use learnhub_auth::{AuthContext, Role, require_role};
use learnhub_core::NoticeId;
use learnhub_learning::{NewNotice, NoticePatch, NoticeRecord};

use super::audit_params;
use crate::error::{RepoError, RepoResult};
use crate::ownership::{NOTICE_AUTHORS, require_notice_author};
use crate::scope::{Scope, active_tenant};
use crate::store::{LmsStore, StoreError, modify};

#[derive(Debug, Clone)]
pub struct NoticeRepository {
    store: Arc<LmsStore>,
    audit: AuditLogService,
}

impl NoticeRepository {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self { store, audit }
    }

    pub async fn create_notice(&self, ctx: &AuthContext, input: NewNotice) -> RepoResult<NoticeRecord> {
        let actor = require_role(ctx, &NOTICE_AUTHORS)?;
        let tenant_id = active_tenant(ctx)?;
        let notice = input.into_record(tenant_id, actor.user_id, Utc::now())?;
        self.store.notices.insert(tenant_id, notice.id, notice.clone())?;

        self.audit
            .log(audit_params(ctx, tenant_id, &actor, AuditAction::Create, "notice").resource_id(notice.id))
            .await;
        Ok(notice)
    }

    /// Newest first, filtered by [`Scope::sees_notice`].
    pub fn list_notices(&self, ctx: &AuthContext) -> RepoResult<Vec<NoticeRecord>> {
        let scope = Scope::resolve(&self.store, ctx, &Role::ALL)?;
        let now = Utc::now();

        let mut notices = self
            .store
            .notices
            .filter(scope.tenant_id, &|n| scope.sees_notice(n, now))?;
        notices.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));
        Ok(notices)
    }

    pub async fn update_notice(
        &self,
        ctx: &AuthContext,
        notice_id: NoticeId,
        patch: NoticePatch,
    ) -> RepoResult<NoticeRecord> {
        let (actor, _) = require_notice_author(&self.store, ctx, notice_id)?;
        let tenant_id = active_tenant(ctx)?;
        let now = Utc::now();

        // Authorship never changes, so only existence is re-checked per attempt.
        let updated = modify(
            &*self.store.notices,
            tenant_id,
            &notice_id,
            |current: Option<&NoticeRecord>| -> RepoResult<Option<NoticeRecord>> {
                let Some(current) = current else {
                    return Err(RepoError::not_found("notice"));
                };
                let mut next = current.clone();
                next.apply(patch.clone(), now)?;
                Ok(Some(next))
            },
        )?
        .ok_or(StoreError::NotFound)?;

        self.audit
            .log(audit_params(ctx, tenant_id, &actor, AuditAction::Update, "notice").resource_id(notice_id))
            .await;
        Ok(updated)
    }

    pub async fn delete_notice(&self, ctx: &AuthContext, notice_id: NoticeId) -> RepoResult<()> {
        let (actor, _) = require_notice_author(&self.store, ctx, notice_id)?;
        let tenant_id = active_tenant(ctx)?;

        if self.store.notices.remove(tenant_id, &notice_id)?.is_none() {
            return Err(RepoError::not_found("notice"));
        }

        self.audit
            .log(audit_params(ctx, tenant_id, &actor, AuditAction::Delete, "notice").resource_id(notice_id))
            .await;
        Ok(())
    }
}
