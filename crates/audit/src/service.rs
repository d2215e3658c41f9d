use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use learnhub_core::TenantId;

use crate::entry::{AuditFilter, AuditLogEntry, AuditParams};
use crate::sink::{AuditError, AuditSink};

/// Side channel for audit outcomes.
#[derive(Debug, Default)]
pub struct AuditCounters {
    written: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub written: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl AuditCounters {
    pub fn snapshot(&self) -> AuditStats {
        AuditStats {
            written: self.written.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Upper bound on a single sink write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Fail-open audit writer.
#[derive(Clone)]
pub struct AuditLogService {
    sink: Arc<dyn AuditSink>,
    counters: Arc<AuditCounters>,
    write_timeout: Duration,
}

impl AuditLogService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            counters: Arc::new(AuditCounters::default()),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Record one entry. Never returns an error and never panics; the outcome
    /// is visible only in logs and [`AuditCounters`].
    pub async fn log(&self, params: AuditParams) {
        let entry = match params.into_entry(Utc::now()) {
            Ok(entry) => entry,
            Err(missing) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(field = missing.0, "audit entry dropped: missing required field");
                return;
            }
        };

        let tenant_id = entry.tenant_id;
        let action = entry.action_type.clone();
        let resource = entry.resource_type.clone();

        let outcome = match tokio::time::timeout(self.write_timeout, self.sink.append(entry)).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::Unavailable(format!(
                "write timed out after {}ms",
                self.write_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(()) => {
                self.counters.written.fetch_add(1, Ordering::Relaxed);
                debug!(tenant_id = %tenant_id, action = %action, resource = %resource, "audit entry written");
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    tenant_id = %tenant_id,
                    action = %action,
                    resource = %resource,
                    error = %err,
                    "audit write failed"
                );
            }
        }
    }

    /// Read path; unlike writes, errors here are surfaced.
    pub async fn query(
        &self,
        tenant_id: TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        self.sink.query(tenant_id, filter).await
    }

    pub fn counters(&self) -> &AuditCounters {
        &self.counters
    }
}

impl std::fmt::Debug for AuditLogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogService")
            .field("counters", &self.counters.snapshot())
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditAction;
    use crate::sink::InMemoryAuditSink;
    use learnhub_core::UserId;

    fn params(tenant: TenantId) -> AuditParams {
        AuditParams::new(tenant, UserId::new(), "ADMIN", AuditAction::Create, "class")
    }

    #[tokio::test]
    async fn writes_are_counted() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let service = AuditLogService::new(sink.clone());
        let tenant = TenantId::new();

        service.log(params(tenant)).await;
        service.log(params(tenant).resource_id("x")).await;

        assert_eq!(sink.snapshot().len(), 2);
        assert_eq!(
            service.counters().snapshot(),
            AuditStats {
                written: 2,
                rejected: 0,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn incomplete_params_are_dropped_silently() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let service = AuditLogService::new(sink.clone());

        let mut p = params(TenantId::new());
        p.actor_id = None;
        service.log(p).await;

        assert!(sink.snapshot().is_empty());
        assert_eq!(service.counters().snapshot().rejected, 1);
    }

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let sink = Arc::new(InMemoryAuditSink::new());
        sink.set_unavailable(true);
        let service = AuditLogService::new(sink.clone());

        service.log(params(TenantId::new())).await;
        assert_eq!(service.counters().snapshot().failed, 1);

        sink.set_unavailable(false);
        service.log(params(TenantId::new())).await;
        assert_eq!(service.counters().snapshot().written, 1);
    }

    struct HangingSink;

    #[async_trait::async_trait]
    impl AuditSink for HangingSink {
        async fn append(&self, _entry: AuditLogEntry) -> Result<(), AuditError> {
            std::future::pending().await
        }

        async fn query(
            &self,
            _tenant_id: TenantId,
            _filter: &AuditFilter,
        ) -> Result<Vec<AuditLogEntry>, AuditError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn hung_sink_does_not_block_the_caller() {
        let service =
            AuditLogService::new(Arc::new(HangingSink)).with_write_timeout(Duration::from_millis(50));

        let returned = tokio::time::timeout(Duration::from_secs(2), service.log(params(TenantId::new())))
            .await
            .is_ok();

        assert!(returned);
        assert_eq!(
            service.counters().snapshot(),
            AuditStats {
                written: 0,
                rejected: 0,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn query_is_tenant_scoped_and_newest_first() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let service = AuditLogService::new(sink);
        let a = TenantId::new();
        let b = TenantId::new();

        service.log(params(a).resource_id("first")).await;
        service.log(params(b).resource_id("other")).await;
        service.log(params(a).resource_id("second")).await;

        let rows = service.query(a, &AuditFilter::default()).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|e| e.resource_id.as_deref()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }
}
