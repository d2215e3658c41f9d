//! Tenant-isolated storage.

pub mod tables;
pub mod tenant_store;

pub use tables::{LmsStore, Table};
pub use tenant_store::{
    InMemoryTenantStore, MAX_MODIFY_ATTEMPTS, StoreError, TenantStore, modify,
};
