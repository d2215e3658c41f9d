//! Tenant directory: the registry the request layer resolves tenants from.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use learnhub_auth::{AccessError, TenantConfig, TenantContext};
use learnhub_core::{DomainError, TenantId};

use crate::error::RepoResult;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    pub config: TenantConfig,
    pub created_at: DateTime<Utc>,
}

impl TenantRecord {
    pub fn context(&self) -> TenantContext {
        TenantContext::new(
            self.id,
            self.slug.as_str(),
            self.name.as_str(),
            self.config.clone(),
        )
    }
}

/// Lowercase, trimmed; `[a-z0-9-]`, not starting or ending with `-`.
pub fn normalize_slug(raw: &str) -> Result<String, DomainError> {
    let slug = raw.trim().to_ascii_lowercase();
    let valid = !slug.is_empty()
        && slug.len() <= 63
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');
    if !valid {
        return Err(DomainError::validation(format!("invalid tenant slug: {raw:?}")));
    }
    Ok(slug)
}

#[derive(Debug, Default)]
pub struct TenantDirectory {
    tenants: RwLock<HashMap<TenantId, Arc<TenantRecord>>>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        slug: &str,
        name: &str,
        config: TenantConfig,
    ) -> RepoResult<Arc<TenantRecord>> {
        let slug = normalize_slug(slug)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("tenant name cannot be empty").into());
        }

        let mut tenants = self
            .tenants
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if tenants.values().any(|t| t.slug == slug) {
            return Err(DomainError::conflict(format!("tenant '{slug}' already exists")).into());
        }

        let record = Arc::new(TenantRecord {
            id: TenantId::new(),
            slug,
            name: name.to_string(),
            config,
            created_at: Utc::now(),
        });
        tenants.insert(record.id, record.clone());
        tracing::info!(tenant_id = %record.id, slug = %record.slug, "tenant registered");
        Ok(record)
    }

    pub fn get(&self, id: TenantId) -> Option<Arc<TenantRecord>> {
        self.tenants.read().ok()?.get(&id).cloned()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<Arc<TenantRecord>> {
        let slug = slug.trim().to_ascii_lowercase();
        self.tenants
            .read()
            .ok()?
            .values()
            .find(|t| t.slug == slug)
            .cloned()
    }

    /// Resolve a request's tenant slug into the context installed on the carrier.
    pub fn resolve(&self, slug: &str) -> Result<TenantContext, AccessError> {
        self.find_by_slug(slug)
            .map(|t| t.context())
            .ok_or_else(|| AccessError::TenantNotFound(slug.trim().to_string()))
    }

    pub fn list(&self) -> Vec<Arc<TenantRecord>> {
        let mut all: Vec<_> = self
            .tenants
            .read()
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;

    #[test]
    fn slugs_are_unique_and_normalized() {
        let dir = TenantDirectory::new();
        let t = dir.register(" Green-Valley ", "Green Valley High", TenantConfig::default()).unwrap();
        assert_eq!(t.slug, "green-valley");

        let dup = dir.register("GREEN-VALLEY", "Other", TenantConfig::default());
        assert!(matches!(dup, Err(RepoError::Domain(DomainError::Conflict(_)))));
        assert!(dir.register("bad slug", "x", TenantConfig::default()).is_err());
    }

    #[test]
    fn resolve_unknown_slug_is_tenant_not_found() {
        let dir = TenantDirectory::new();
        dir.register("acme", "Acme", TenantConfig::default()).unwrap();

        let ctx = dir.resolve("ACME").unwrap();
        assert_eq!(ctx.tenant_slug(), "acme");
        assert_eq!(
            dir.resolve("nope"),
            Err(AccessError::TenantNotFound("nope".to_string()))
        );
    }
}
