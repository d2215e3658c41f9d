//! Append-only audit log.
//!
//! Writes go through [`AuditLogService`], which never fails its caller: entries
//! missing a required field are dropped, and sink failures or writes that outlast
//! the write timeout are swallowed. Both
//! outcomes are reported through `tracing` and [`AuditCounters`].

pub mod entry;
pub mod service;
pub mod sink;

pub use entry::{AuditAction, AuditFilter, AuditLogEntry, AuditParams, MissingField};
pub use service::{AuditCounters, AuditLogService, AuditStats, DEFAULT_WRITE_TIMEOUT};
pub use sink::{AuditError, AuditSink, InMemoryAuditSink};
