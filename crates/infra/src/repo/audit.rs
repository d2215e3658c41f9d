use learnhub_audit::{AuditFilter, AuditLogEntry, AuditLogService, AuditStats};
use learnhub_auth::AuthContext;

use crate::error::RepoResult;
use crate::ownership::require_admin_tenant_scope;

/// Read side of the audit log. There is no update or delete path.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    audit: AuditLogService,
}

impl AuditLogRepository {
    pub fn new(audit: AuditLogService) -> Self {
        Self { audit }
    }

    /// ADMIN: entries of the caller's tenant, newest first.
    pub async fn list_audit_logs(
        &self,
        ctx: &AuthContext,
        filter: &AuditFilter,
    ) -> RepoResult<Vec<AuditLogEntry>> {
        let (_, tenant_id) = require_admin_tenant_scope(ctx)?;
        Ok(self.audit.query(tenant_id, filter).await?)
    }

    /// ADMIN: process-wide audit outcome counters.
    pub fn stats(&self, ctx: &AuthContext) -> RepoResult<AuditStats> {
        require_admin_tenant_scope(ctx)?;
        Ok(self.audit.counters().snapshot())
    }
}
