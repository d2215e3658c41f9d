//! Repositories: one per entity family.
//!
//! Each operation composes the same steps: guard the role, resolve the
//! caller's scope or relationship, run the tenant-filtered read/write, and
//! append an audit entry for mutations.

pub mod assessments;
pub mod audit;
pub mod courses;
pub mod notices;
pub mod progress;
pub mod structure;
pub mod users;

use std::sync::Arc;

use learnhub_audit::{AuditAction, AuditLogService, AuditParams};
use learnhub_auth::{Actor, AuthContext};
use learnhub_core::TenantId;

use crate::store::LmsStore;

pub use assessments::AssessmentRepository;
pub use audit::AuditLogRepository;
pub use courses::CourseRepository;
pub use notices::NoticeRepository;
pub use progress::{CourseAnalytics, ProgressRepository};
pub use structure::StructureRepository;
pub use users::UserRepository;

fn audit_params(
    ctx: &AuthContext,
    tenant_id: TenantId,
    actor: &Actor,
    action: AuditAction,
    resource_type: &str,
) -> AuditParams {
    let client = ctx.client();
    AuditParams::new(tenant_id, actor.user_id, actor.role.as_str(), action, resource_type)
        .client(client.ip_address.clone(), client.user_agent.clone())
}

/// Every repository over one shared store and audit writer.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub structure: StructureRepository,
    pub courses: CourseRepository,
    pub assessments: AssessmentRepository,
    pub progress: ProgressRepository,
    pub notices: NoticeRepository,
    pub audit_logs: AuditLogRepository,
}

impl Repositories {
    pub fn new(store: Arc<LmsStore>, audit: AuditLogService) -> Self {
        Self {
            users: UserRepository::new(store.clone(), audit.clone()),
            structure: StructureRepository::new(store.clone(), audit.clone()),
            courses: CourseRepository::new(store.clone(), audit.clone()),
            assessments: AssessmentRepository::new(store.clone(), audit.clone()),
            progress: ProgressRepository::new(store.clone(), audit.clone()),
            notices: NoticeRepository::new(store, audit.clone()),
            audit_logs: AuditLogRepository::new(audit),
        }
    }
}
