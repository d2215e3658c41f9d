//! Tenant notices: announcement board entries targeted at roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_auth::Role;
use learnhub_core::{DomainError, DomainResult, NoticeId, TenantId, UserId};

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCategory {
    General,
    Academic,
    Event,
    Exam,
    Holiday,
    Emergency,
}

impl NoticeCategory {
    pub const ALL: [NoticeCategory; 6] = [
        NoticeCategory::General,
        NoticeCategory::Academic,
        NoticeCategory::Event,
        NoticeCategory::Exam,
        NoticeCategory::Holiday,
        NoticeCategory::Emergency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoticeCategory::General => "GENERAL",
            NoticeCategory::Academic => "ACADEMIC",
            NoticeCategory::Event => "EVENT",
            NoticeCategory::Exam => "EXAM",
            NoticeCategory::Holiday => "HOLIDAY",
            NoticeCategory::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for NoticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown notice category: {wanted}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeRecord {
    pub id: NoticeId,
    pub tenant_id: TenantId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub category: NoticeCategory,
    /// Empty means every role.
    pub target_roles: Vec<Role>,
    pub published_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl NoticeRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.published_at <= now && self.expires_at.is_none_or(|e| e > now)
    }

    pub fn targets(&self, role: Role) -> bool {
        self.target_roles.is_empty() || self.target_roles.contains(&role)
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// Apply a partial update, re-checking every rule a new notice must pass.
    pub fn apply(&mut self, patch: NoticePatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = clean_title(&title)?;
        }
        if let Some(content) = patch.content {
            next.content = clean_content(&content)?;
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(roles) = patch.target_roles {
            next.target_roles = dedup_roles(roles);
        }
        if let Some(expires_at) = patch.expires_at {
            next.expires_at = Some(expires_at);
        }
        check_window(next.published_at, next.expires_at)?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub category: NoticeCategory,
    #[serde(default)]
    pub target_roles: Vec<Role>,
    /// Defaults to creation time.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewNotice {
    pub fn into_record(
        self,
        tenant_id: TenantId,
        author_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<NoticeRecord> {
        let published_at = self.published_at.unwrap_or(now);
        check_window(published_at, self.expires_at)?;
        Ok(NoticeRecord {
            id: NoticeId::new(),
            tenant_id,
            author_id,
            title: clean_title(&self.title)?,
            content: clean_content(&self.content)?,
            category: self.category,
            target_roles: dedup_roles(self.target_roles),
            published_at,
            expires_at: self.expires_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NoticeCategory>,
    pub target_roles: Option<Vec<Role>>,
    pub expires_at: Option<DateTime<Utc>>,
}

fn clean_title(raw: &str) -> DomainResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::validation("notice title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "notice title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn clean_content(raw: &str) -> DomainResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(DomainError::validation("notice content cannot be empty"));
    }
    Ok(content.to_string())
}

fn check_window(published_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> DomainResult<()> {
    match expires_at {
        Some(expires_at) if expires_at <= published_at => Err(DomainError::validation(
            "expiresAt must be after publishedAt",
        )),
        _ => Ok(()),
    }
}

fn dedup_roles(roles: Vec<Role>) -> Vec<Role> {
    let mut out = Vec::with_capacity(roles.len());
    for role in roles {
        if !out.contains(&role) {
            out.push(role);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn notice(target_roles: Vec<Role>) -> NewNotice {
        NewNotice {
            title: " Sports day ".to_string(),
            content: "Bring water.".to_string(),
            category: NoticeCategory::Event,
            target_roles,
            published_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("exam".parse::<NoticeCategory>().unwrap(), NoticeCategory::Exam);
        assert_eq!(" HOLIDAY ".parse::<NoticeCategory>().unwrap(), NoticeCategory::Holiday);
        assert!("PARTY".parse::<NoticeCategory>().is_err());
    }

    #[test]
    fn unknown_category_is_rejected_on_deserialize() {
        let raw = r#"{"title":"t","content":"c","category":"PARTY"}"#;
        assert!(serde_json::from_str::<NewNotice>(raw).is_err());
    }

    #[test]
    fn expiry_must_follow_publication() {
        let now = Utc::now();
        let mut input = notice(vec![]);
        input.expires_at = Some(now - Duration::hours(1));
        let err = input.into_record(TenantId::new(), UserId::new(), now).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_targets_reach_everyone() {
        let n = notice(vec![])
            .into_record(TenantId::new(), UserId::new(), Utc::now())
            .unwrap();
        assert!(Role::ALL.iter().all(|r| n.targets(*r)));
        assert_eq!(n.title, "Sports day");

        let parents = notice(vec![Role::Parent, Role::Parent])
            .into_record(TenantId::new(), UserId::new(), Utc::now())
            .unwrap();
        assert_eq!(parents.target_roles, vec![Role::Parent]);
        assert!(!parents.targets(Role::Student));
    }

    #[test]
    fn expired_notices_are_inactive() {
        let now = Utc::now();
        let mut input = notice(vec![]);
        input.expires_at = Some(now + Duration::days(1));
        let n = input.into_record(TenantId::new(), UserId::new(), now).unwrap();
        assert!(n.is_active(now));
        assert!(!n.is_active(now + Duration::days(2)));
    }

    #[test]
    fn rejected_patch_leaves_notice_unchanged() {
        let now = Utc::now();
        let mut n = notice(vec![])
            .into_record(TenantId::new(), UserId::new(), now)
            .unwrap();
        let before = n.clone();
        let patch = NoticePatch {
            title: Some("Moved".to_string()),
            expires_at: Some(now - Duration::days(1)),
            ..NoticePatch::default()
        };
        assert!(n.apply(patch, now).is_err());
        assert_eq!(n, before);

        n.apply(
            NoticePatch {
                category: Some(NoticeCategory::Emergency),
                ..NoticePatch::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(n.category, NoticeCategory::Emergency);
    }
}
