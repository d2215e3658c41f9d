//! `learnhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other crate
//! (identifiers, the domain error model). No infrastructure concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{
    AssessmentId, AuditEntryId, ClassId, ClassSubjectId, CourseId, LessonId, NoticeId, QuestionId,
    SubjectId, SubmissionId, TenantId, UserId,
};
