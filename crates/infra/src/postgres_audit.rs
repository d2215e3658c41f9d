//! Postgres-backed audit sink.
//!
//! Rows are only ever inserted; every query carries `tenant_id`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | AuditError |
//! |------------|------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io` | `Unavailable` |
//! | anything else | `Backend` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use learnhub_audit::{AuditError, AuditFilter, AuditLogEntry, AuditSink};
use learnhub_core::{AuditEntryId, TenantId, UserId};

const SCHEMA: &str = include_str!("../migrations/0001_audit_logs.sql");

/// Kept below the audit write timeout so an outage surfaces as `PoolTimedOut`.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct PostgresAuditSink {
    pool: Arc<PgPool>,
}

impl PostgresAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AuditError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the audit table and indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), AuditError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, tenant_id, actor_id, actor_role, action_type, resource_type,
                resource_id, metadata, ip_address, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*entry.id.as_uuid())
        .bind(*entry.tenant_id.as_uuid())
        .bind(*entry.actor_id.as_uuid())
        .bind(&entry.actor_role)
        .bind(&entry.action_type)
        .bind(&entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.metadata)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append", e))?;
        Ok(())
    }

    async fn query(
        &self,
        tenant_id: TenantId,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditLogEntry>, AuditError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, tenant_id, actor_id, actor_role, action_type, resource_type, \
             resource_id, metadata, ip_address, user_agent, created_at \
             FROM audit_logs WHERE tenant_id = ",
        );
        qb.push_bind(*tenant_id.as_uuid());
        if let Some(actor_id) = filter.actor_id {
            qb.push(" AND actor_id = ").push_bind(*actor_id.as_uuid());
        }
        if let Some(resource_type) = &filter.resource_type {
            qb.push(" AND lower(resource_type) = lower(")
                .push_bind(resource_type.clone())
                .push(")");
        }
        if let Some(action_type) = &filter.action_type {
            qb.push(" AND lower(action_type) = lower(")
                .push_bind(action_type.clone())
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.effective_limit() as i64);

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("query", e))?;

        rows.iter()
            .map(|row| {
                AuditRow::from_row(row)
                    .map(AuditLogEntry::from)
                    .map_err(|e| AuditError::Backend(format!("failed to decode audit row: {e}")))
            })
            .collect()
    }
}

struct AuditRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    actor_id: uuid::Uuid,
    actor_role: String,
    action_type: String,
    resource_type: String,
    resource_id: Option<String>,
    metadata: serde_json::Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for AuditRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AuditRow {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            actor_id: row.try_get("actor_id")?,
            actor_role: row.try_get("actor_role")?,
            action_type: row.try_get("action_type")?,
            resource_type: row.try_get("resource_type")?,
            resource_id: row.try_get("resource_id")?,
            metadata: row.try_get("metadata")?,
            ip_address: row.try_get("ip_address")?,
            user_agent: row.try_get("user_agent")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<AuditRow> for AuditLogEntry {
    fn from(row: AuditRow) -> Self {
        AuditLogEntry {
            id: AuditEntryId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            actor_id: UserId::from_uuid(row.actor_id),
            actor_role: row.actor_role,
            action_type: row.action_type,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            metadata: row.metadata,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> AuditError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            AuditError::Unavailable(format!("{operation}: {err}"))
        }
        other => AuditError::Backend(format!("{operation}: {other}")),
    }
}
