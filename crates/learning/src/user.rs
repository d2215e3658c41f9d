use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_auth::Role;
use learnhub_core::{ClassId, TenantId, UserId};

/// A domain user with their single role assignment in the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub tenant_id: TenantId,
    /// Subject at the external identity provider.
    pub auth_subject: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Student extension profile. `class_id` is the authoritative enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub class_id: ClassId,
    pub section_id: Option<String>,
}

/// Parent -> student link (a parent may link many students).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLink {
    pub tenant_id: TenantId,
    pub parent_id: UserId,
    pub student_id: UserId,
    pub linked_at: DateTime<Utc>,
}
