//! Documentation-level capability matrix.
//!
//! This table describes what each role may do so it can be rendered for
//! users and audited in review. It is **not** an enforcement point: every
//! allow/deny decision goes through [`crate::guard::require_role`].

use serde::Serialize;

use crate::Role;

/// A coarse capability in the learning platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageStructure,
    ManageUsers,
    CreateCourse,
    ViewCourses,
    CreateAssessment,
    SubmitAssessment,
    ViewSubmissions,
    UpdateProgress,
    ViewProgress,
    PublishNotice,
    ViewNotices,
    ViewAnalytics,
    ViewAuditLog,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Capability::ManageStructure,
        Capability::ManageUsers,
        Capability::CreateCourse,
        Capability::ViewCourses,
        Capability::CreateAssessment,
        Capability::SubmitAssessment,
        Capability::ViewSubmissions,
        Capability::UpdateProgress,
        Capability::ViewProgress,
        Capability::PublishNotice,
        Capability::ViewNotices,
        Capability::ViewAnalytics,
        Capability::ViewAuditLog,
    ];
}

const ADMIN: &[Capability] = &[
    Capability::ManageStructure,
    Capability::ManageUsers,
    Capability::ViewCourses,
    Capability::ViewProgress,
    Capability::PublishNotice,
    Capability::ViewNotices,
    Capability::ViewAnalytics,
    Capability::ViewAuditLog,
];

const TEACHER: &[Capability] = &[
    Capability::CreateCourse,
    Capability::ViewCourses,
    Capability::CreateAssessment,
    Capability::ViewSubmissions,
    Capability::ViewProgress,
    Capability::PublishNotice,
    Capability::ViewNotices,
    Capability::ViewAnalytics,
];

const STUDENT: &[Capability] = &[
    Capability::ViewCourses,
    Capability::SubmitAssessment,
    Capability::UpdateProgress,
    Capability::ViewProgress,
    Capability::ViewNotices,
];

const PARENT: &[Capability] = &[
    Capability::ViewCourses,
    Capability::ViewProgress,
    Capability::ViewNotices,
];

fn allowed_for(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => ADMIN,
        Role::Teacher => TEACHER,
        Role::Student => STUDENT,
        Role::Parent => PARENT,
    }
}

/// One row of the matrix.
#[derive(Debug, Clone, Serialize)]
pub struct RoleCapabilities {
    pub role: Role,
    pub allowed: Vec<Capability>,
    pub forbidden: Vec<Capability>,
}

impl RoleCapabilities {
    pub fn allows(&self, capability: Capability) -> bool {
        self.allowed.contains(&capability)
    }
}

/// The full matrix, one row per role in [`Role::ALL`] order.
pub fn capability_matrix() -> Vec<RoleCapabilities> {
    Role::ALL
        .iter()
        .map(|&role| {
            let allowed = allowed_for(role).to_vec();
            let forbidden = Capability::ALL
                .iter()
                .copied()
                .filter(|c| !allowed.contains(c))
                .collect();
            RoleCapabilities {
                role,
                allowed,
                forbidden,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_capability_is_classified_for_every_role() {
        for row in capability_matrix() {
            assert_eq!(
                row.allowed.len() + row.forbidden.len(),
                Capability::ALL.len(),
                "role {}",
                row.role
            );
        }
    }

    #[test]
    fn only_students_submit_assessments() {
        let submitters: Vec<Role> = capability_matrix()
            .into_iter()
            .filter(|r| r.allows(Capability::SubmitAssessment))
            .map(|r| r.role)
            .collect();
        assert_eq!(submitters, vec![Role::Student]);
    }

    #[test]
    fn audit_log_is_admin_only() {
        let readers: Vec<Role> = capability_matrix()
            .into_iter()
            .filter(|r| r.allows(Capability::ViewAuditLog))
            .map(|r| r.role)
            .collect();
        assert_eq!(readers, vec![Role::Admin]);
    }
}
