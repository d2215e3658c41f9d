//! Lesson progress and its monotonic status machine.
//!
//! ```text
//! NOT_STARTED(0) -> IN_PROGRESS(1) -> COMPLETED(2)
//! ```
//!
//! Skipping forward is allowed; moving to a lower rank never is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_core::{CourseId, DomainError, DomainResult, LessonId, TenantId, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 3] = [
        ProgressStatus::NotStarted,
        ProgressStatus::InProgress,
        ProgressStatus::Completed,
    ];

    pub fn rank(self) -> u8 {
        match self {
            ProgressStatus::NotStarted => 0,
            ProgressStatus::InProgress => 1,
            ProgressStatus::Completed => 2,
        }
    }
}

/// Outcome of applying a requested status to the stored one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No row existed yet.
    Created(ProgressStatus),
    Advanced {
        from: ProgressStatus,
        to: ProgressStatus,
    },
    /// Same status requested again; nothing to write.
    Unchanged(ProgressStatus),
}

impl Transition {
    pub fn status(self) -> ProgressStatus {
        match self {
            Transition::Created(s) | Transition::Unchanged(s) => s,
            Transition::Advanced { to, .. } => to,
        }
    }

    pub fn is_write(self) -> bool {
        !matches!(self, Transition::Unchanged(_))
    }
}

pub fn advance(current: Option<ProgressStatus>, next: ProgressStatus) -> DomainResult<Transition> {
    let Some(current) = current else {
        return Ok(Transition::Created(next));
    };

    match next.rank().cmp(&current.rank()) {
        std::cmp::Ordering::Less => Err(DomainError::invariant("progress cannot regress")),
        std::cmp::Ordering::Equal => Ok(Transition::Unchanged(current)),
        std::cmp::Ordering::Greater => Ok(Transition::Advanced {
            from: current,
            to: next,
        }),
    }
}

/// One row per (tenant, student, lesson).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub tenant_id: TenantId,
    pub student_id: UserId,
    pub lesson_id: LessonId,
    pub course_id: CourseId,
    pub status: ProgressStatus,
    pub last_accessed_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn start(
        tenant_id: TenantId,
        student_id: UserId,
        lesson_id: LessonId,
        course_id: CourseId,
        status: ProgressStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            student_id,
            lesson_id,
            course_id,
            status,
            last_accessed_at: now,
            completed_at: (status == ProgressStatus::Completed).then_some(now),
        }
    }

    /// Apply `next` in place. The record is untouched on error or no-op.
    pub fn apply(&mut self, next: ProgressStatus, now: DateTime<Utc>) -> DomainResult<Transition> {
        let transition = advance(Some(self.status), next)?;
        if let Transition::Advanced { to, .. } = transition {
            self.status = to;
            self.last_accessed_at = now;
            if to == ProgressStatus::Completed {
                self.completed_at = Some(now);
            }
        }
        Ok(transition)
    }
}
