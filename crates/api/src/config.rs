//! Process configuration, read once at startup from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `LEARNHUB_BIND_ADDR` | `0.0.0.0:8080` |
//! | `LEARNHUB_SESSION_SECRET` | insecure dev secret (warns) |
//! | `LEARNHUB_TENANT_HEADER` | `x-tenant-slug` |
//! | `USE_PERSISTENT_AUDIT` | `false` |
//! | `DATABASE_URL` | required when persistent audit is on |
//! | `LEARNHUB_SEED_TENANTS` | none; `slug:Name,slug2:Name 2` |

use std::net::SocketAddr;

use anyhow::{Context, bail};
use axum::http::HeaderName;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-slug";
const DEV_SESSION_SECRET: &str = "dev-secret";

/// Where audit entries are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditBackend {
    InMemory,
    Postgres { database_url: String },
}

/// A tenant created at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSeed {
    pub slug: String,
    pub name: String,
}

impl TenantSeed {
    /// `slug:Display Name`; the name defaults to the slug.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (slug, name) = match raw.split_once(':') {
            Some((slug, name)) => (slug.trim(), name.trim()),
            None => (raw.trim(), raw.trim()),
        };
        if slug.is_empty() {
            bail!("tenant seed '{raw}' has an empty slug");
        }
        Ok(Self {
            slug: slug.to_string(),
            name: if name.is_empty() { slug } else { name }.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub tenant_header: HeaderName,
    pub audit: AuditBackend,
    pub seed_tenants: Vec<TenantSeed>,
}

impl AppConfig {
    /// Defaults with the given session secret; nothing read from the environment.
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_secret: session_secret.into(),
            tenant_header: HeaderName::from_static(DEFAULT_TENANT_HEADER),
            audit: AuditBackend::InMemory,
            seed_tenants: Vec::new(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("LEARNHUB_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("LEARNHUB_BIND_ADDR must be a socket address")?;

        let session_secret = match lookup("LEARNHUB_SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("LEARNHUB_SESSION_SECRET not set; using insecure dev default");
                DEV_SESSION_SECRET.to_string()
            }
        };

        let tenant_header = lookup("LEARNHUB_TENANT_HEADER")
            .unwrap_or_else(|| DEFAULT_TENANT_HEADER.to_string())
            .to_ascii_lowercase()
            .parse::<HeaderName>()
            .context("LEARNHUB_TENANT_HEADER must be a valid header name")?;

        let persistent = lookup("USE_PERSISTENT_AUDIT")
            .map(|v| v.trim().parse::<bool>())
            .transpose()
            .context("USE_PERSISTENT_AUDIT must be 'true' or 'false'")?
            .unwrap_or(false);
        let audit = if persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .context("DATABASE_URL must be set when USE_PERSISTENT_AUDIT=true")?;
            AuditBackend::Postgres { database_url }
        } else {
            AuditBackend::InMemory
        };

        let seed_tenants = lookup("LEARNHUB_SEED_TENANTS")
            .map(|raw| {
                raw.split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(TenantSeed::parse)
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()
            .context("LEARNHUB_SEED_TENANTS is malformed")?
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            session_secret,
            tenant_header,
            audit,
            seed_tenants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.tenant_header.as_str(), DEFAULT_TENANT_HEADER);
        assert_eq!(cfg.audit, AuditBackend::InMemory);
        assert!(cfg.seed_tenants.is_empty());
    }

    #[test]
    fn persistent_audit_requires_database_url() {
        assert!(config(&[("USE_PERSISTENT_AUDIT", "true")]).is_err());

        let cfg = config(&[
            ("USE_PERSISTENT_AUDIT", "true"),
            ("DATABASE_URL", "postgres://localhost/learnhub"),
        ])
        .unwrap();
        assert!(matches!(cfg.audit, AuditBackend::Postgres { .. }));
    }

    #[test]
    fn malformed_values_fail() {
        assert!(config(&[("LEARNHUB_BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("USE_PERSISTENT_AUDIT", "maybe")]).is_err());
        assert!(config(&[("LEARNHUB_SEED_TENANTS", ":Nameless")]).is_err());
    }

    #[test]
    fn seed_tenants_parse() {
        let cfg = config(&[("LEARNHUB_SEED_TENANTS", "greenfield:Greenfield High, riverside")]).unwrap();
        assert_eq!(
            cfg.seed_tenants,
            vec![
                TenantSeed {
                    slug: "greenfield".into(),
                    name: "Greenfield High".into()
                },
                TenantSeed {
                    slug: "riverside".into(),
                    name: "riverside".into()
                },
            ]
        );
    }
}
