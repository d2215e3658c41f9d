use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use learnhub_core::{AuditEntryId, TenantId, UserId};

/// Default and upper bound for audit queries.
pub const DEFAULT_QUERY_LIMIT: usize = 100;
pub const MAX_QUERY_LIMIT: usize = 500;

/// Mutation kinds recorded by the repositories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Submit,
    AssignRole,
    Link,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Submit => "SUBMIT",
            AuditAction::AssignRole => "ASSIGN_ROLE",
            AuditAction::Link => "LINK",
        }
    }
}

/// An immutable audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub tenant_id: TenantId,
    pub actor_id: UserId,
    pub actor_role: String,
    pub action_type: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub metadata: Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input to [`crate::AuditLogService::log`].
///
/// The first five fields are required; they are optional here so that a
/// caller with an incomplete context still gets a logged drop instead of an
/// error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditParams {
    pub tenant_id: Option<TenantId>,
    pub actor_id: Option<UserId>,
    pub actor_role: Option<String>,
    pub action_type: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// The first required field found missing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl AuditParams {
    pub fn new(
        tenant_id: TenantId,
        actor_id: UserId,
        actor_role: impl Into<String>,
        action: AuditAction,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            actor_id: Some(actor_id),
            actor_role: Some(actor_role.into()),
            action_type: Some(action.as_str().to_string()),
            resource_type: Some(resource_type.into()),
            ..Self::default()
        }
    }

    pub fn resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn into_entry(self, now: DateTime<Utc>) -> Result<AuditLogEntry, MissingField> {
        fn text(v: Option<String>, name: &'static str) -> Result<String, MissingField> {
            v.filter(|s| !s.trim().is_empty()).ok_or(MissingField(name))
        }

        let tenant_id = self.tenant_id.ok_or(MissingField("tenantId"))?;
        let actor_id = self.actor_id.ok_or(MissingField("actorId"))?;
        let actor_role = text(self.actor_role, "actorRole")?;
        let action_type = text(self.action_type, "actionType")?;
        let resource_type = text(self.resource_type, "resourceType")?;

        Ok(AuditLogEntry {
            id: AuditEntryId::new(),
            tenant_id,
            actor_id,
            actor_role,
            action_type,
            resource_type,
            resource_id: self.resource_id,
            metadata: self.metadata.unwrap_or(Value::Null),
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: now,
        })
    }
}

/// Read-side filter for the audit log. All set fields must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    pub actor_id: Option<UserId>,
    pub resource_type: Option<String>,
    pub action_type: Option<String>,
    pub limit: usize,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self {
            actor_id: None,
            resource_type: None,
            action_type: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl AuditFilter {
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_QUERY_LIMIT)
    }

    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.actor_id.is_none_or(|a| a == entry.actor_id)
            && self
                .resource_type
                .as_deref()
                .is_none_or(|r| r.eq_ignore_ascii_case(&entry.resource_type))
            && self
                .action_type
                .as_deref()
                .is_none_or(|a| a.eq_ignore_ascii_case(&entry.action_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AuditParams {
        AuditParams::new(
            TenantId::new(),
            UserId::new(),
            "TEACHER",
            AuditAction::Create,
            "course",
        )
    }

    #[test]
    fn complete_params_become_entry() {
        let entry = params()
            .resource_id("c-1")
            .client(Some("10.0.0.1".into()), None)
            .into_entry(Utc::now())
            .unwrap();
        assert_eq!(entry.action_type, "CREATE");
        assert_eq!(entry.resource_id.as_deref(), Some("c-1"));
        assert_eq!(entry.metadata, Value::Null);
    }

    #[test]
    fn each_required_field_is_checked() {
        let now = Utc::now();
        let cases: [(fn(&mut AuditParams), &str); 5] = [
            (|p| p.tenant_id = None, "tenantId"),
            (|p| p.actor_id = None, "actorId"),
            (|p| p.actor_role = Some(" ".into()), "actorRole"),
            (|p| p.action_type = None, "actionType"),
            (|p| p.resource_type = None, "resourceType"),
        ];
        for (strip, field) in cases {
            let mut p = params();
            strip(&mut p);
            assert_eq!(p.into_entry(now), Err(MissingField(field)));
        }
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let entry = params().into_entry(Utc::now()).unwrap();
        let filter = AuditFilter {
            resource_type: Some("COURSE".into()),
            action_type: Some("create".into()),
            ..AuditFilter::default()
        };
        assert!(filter.matches(&entry));

        let other_actor = AuditFilter {
            actor_id: Some(UserId::new()),
            ..AuditFilter::default()
        };
        assert!(!other_actor.matches(&entry));
    }

    #[test]
    fn limit_is_bounded() {
        let f = AuditFilter {
            limit: 10_000,
            ..AuditFilter::default()
        };
        assert_eq!(f.effective_limit(), MAX_QUERY_LIMIT);
        let f = AuditFilter {
            limit: 0,
            ..AuditFilter::default()
        };
        assert_eq!(f.effective_limit(), 1);
    }
}
