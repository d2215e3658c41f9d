//! Storage and audit wiring shared by every handler.

use std::sync::Arc;

use anyhow::Context;

use learnhub_audit::{AuditLogService, AuditSink, InMemoryAuditSink};
use learnhub_auth::TenantConfig;
use learnhub_infra::{LmsStore, PostgresAuditSink, Repositories, TenantDirectory};

use crate::config::{AppConfig, AuditBackend};

#[derive(Debug, Clone)]
pub struct AppServices {
    pub tenants: Arc<TenantDirectory>,
    pub repos: Repositories,
}

/// In-memory tables; audit entries go to Postgres when configured.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let sink: Arc<dyn AuditSink> = match &config.audit {
        AuditBackend::InMemory => Arc::new(InMemoryAuditSink::new()),
        AuditBackend::Postgres { database_url } => {
            let sink = PostgresAuditSink::connect(database_url)
                .await
                .context("failed to connect audit store")?;
            sink.ensure_schema()
                .await
                .context("failed to prepare audit_logs schema")?;
            tracing::info!("audit log persisted to postgres");
            Arc::new(sink)
        }
    };

    let tenants = Arc::new(TenantDirectory::new());
    for seed in &config.seed_tenants {
        tenants
            .register(&seed.slug, &seed.name, TenantConfig::default())
            .with_context(|| format!("failed to seed tenant '{}'", seed.slug))?;
    }

    let store = Arc::new(LmsStore::in_memory());
    Ok(AppServices {
        tenants,
        repos: Repositories::new(store, AuditLogService::new(sink)),
    })
}
