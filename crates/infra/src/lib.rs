//! Infrastructure layer: tenant-isolated storage, access scoping and the
//! repositories built on them.

pub mod error;
pub mod ownership;
pub mod postgres_audit;
pub mod repo;
pub mod scope;
pub mod store;
pub mod tenants;


pub use error::{RepoError, RepoResult};
pub use postgres_audit::PostgresAuditSink;
pub use repo::{
    AssessmentRepository, AuditLogRepository, CourseAnalytics, CourseRepository,
    NoticeRepository, ProgressRepository, Repositories, StructureRepository, UserRepository,
};
pub use scope::{Reach, Scope, active_tenant};
pub use store::{InMemoryTenantStore, LmsStore, StoreError, TenantStore};
pub use tenants::{TenantDirectory, TenantRecord};
