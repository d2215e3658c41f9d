//! Academic structure: classes, subjects and the class <-> subject mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_core::{ClassId, ClassSubjectId, DomainError, DomainResult, SubjectId, TenantId};

const MAX_NAME_LEN: usize = 120;

/// Trim and validate a display name.
pub fn normalize_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Key used for per-tenant name uniqueness ("Grade 10" == " grade 10").
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: ClassId,
    pub tenant_id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl ClassRecord {
    pub fn new(tenant_id: TenantId, name: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: ClassId::new(),
            tenant_id,
            name: normalize_name(name)?,
            created_at: now,
        })
    }

    pub fn same_name(&self, other: &str) -> bool {
        name_key(&self.name) == name_key(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub tenant_id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SubjectRecord {
    pub fn new(tenant_id: TenantId, name: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: SubjectId::new(),
            tenant_id,
            name: normalize_name(name)?,
            created_at: now,
        })
    }

    pub fn same_name(&self, other: &str) -> bool {
        name_key(&self.name) == name_key(other)
    }
}

/// A subject taught in a class. `(class_id, subject_id)` is unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSubjectRecord {
    pub id: ClassSubjectId,
    pub tenant_id: TenantId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

impl ClassSubjectRecord {
    pub fn new(tenant_id: TenantId, class_id: ClassId, subject_id: SubjectId) -> Self {
        Self {
            id: ClassSubjectId::new(),
            tenant_id,
            class_id,
            subject_id,
        }
    }

    pub fn pairs(&self, class_id: ClassId, subject_id: SubjectId) -> bool {
        self.class_id == class_id && self.subject_id == subject_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(normalize_name("  Grade 10 ").unwrap(), "Grade 10");
        assert!(matches!(normalize_name("   "), Err(DomainError::Validation(_))));
        assert!(normalize_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn uniqueness_key_ignores_case_and_padding() {
        let class = ClassRecord::new(TenantId::new(), "Grade 10", Utc::now()).unwrap();
        assert!(class.same_name(" grade 10"));
        assert!(!class.same_name("Grade 11"));
    }
}
