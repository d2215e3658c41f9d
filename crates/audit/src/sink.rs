use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use learnhub_core::TenantId;

use crate::entry::{AuditFilter, AuditLogEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit storage unavailable: {0}")]
    Unavailable(String),

    #[error("audit storage error: {0}")]
    Backend(String),
}

/// Append-only audit storage. There is deliberately no update or delete.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError>;

    /// Entries for one tenant matching `filter`, newest first.
    async fn query(
        &self,
        tenant_id: TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditError>;
}

#[async_trait]
impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        (**self).append(entry).await
    }

    async fn query(
        &self,
        tenant_id: TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        (**self).query(tenant_id, filter).await
    }
}

/// In-memory audit sink for tests/dev.
///
/// `set_unavailable(true)` makes every append fail, which is how outage
/// behaviour is exercised without a database.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: RwLock<Vec<AuditLogEntry>>,
    unavailable: AtomicBool,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Every entry across tenants, in append order.
    pub fn snapshot(&self) -> Vec<AuditLogEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("sink disabled".to_string()));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuditError::Backend("lock poisoned".to_string()))?;
        entries.push(entry);
        Ok(())
    }

    async fn query(
        &self,
        tenant_id: TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuditError::Backend("lock poisoned".to_string()))?;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.tenant_id == tenant_id && filter.matches(e))
            .take(filter.effective_limit())
            .cloned()
            .collect())
    }
}
