use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_core::{
    ClassId, CourseId, DomainError, DomainResult, LessonId, SubjectId, TenantId, UserId,
};

/// A course, owned by exactly one teacher and offered to one class.
///
/// Students see a course when their profile's class matches `class_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub id: CourseId,
    pub tenant_id: TenantId,
    pub title: String,
    pub description: String,
    pub teacher_id: UserId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub created_at: DateTime<Utc>,
}

impl CourseRecord {
    pub fn is_taught_by(&self, user_id: UserId) -> bool {
        self.teacher_id == user_id
    }
}

/// Input for course creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

impl NewCourse {
    pub fn into_record(
        self,
        tenant_id: TenantId,
        teacher_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<CourseRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("course title cannot be empty"));
        }
        Ok(CourseRecord {
            id: CourseId::new(),
            tenant_id,
            title: title.to_string(),
            description: self.description.trim().to_string(),
            teacher_id,
            class_id: self.class_id,
            subject_id: self.subject_id,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: LessonId,
    pub tenant_id: TenantId,
    pub course_id: CourseId,
    pub title: String,
    /// Zero-based position within the course.
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub title: String,
}

impl NewLesson {
    pub fn into_record(
        self,
        course: &CourseRecord,
        position: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<LessonRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("lesson title cannot be empty"));
        }
        Ok(LessonRecord {
            id: LessonId::new(),
            tenant_id: course.tenant_id,
            course_id: course.id,
            title: title.to_string(),
            position,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_course(title: &str) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: "  Mechanics and waves ".to_string(),
            class_id: ClassId::new(),
            subject_id: SubjectId::new(),
        }
    }

    #[test]
    fn course_requires_title() {
        let err = new_course("  ")
            .into_record(TenantId::new(), UserId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn course_is_owned_by_creator() {
        let teacher = UserId::new();
        let course = new_course("Physics")
            .into_record(TenantId::new(), teacher, Utc::now())
            .unwrap();
        assert!(course.is_taught_by(teacher));
        assert!(!course.is_taught_by(UserId::new()));
        assert_eq!(course.description, "Mechanics and waves");
    }

    #[test]
    fn lesson_inherits_course_tenant() {
        let course = new_course("Physics")
            .into_record(TenantId::new(), UserId::new(), Utc::now())
            .unwrap();
        let lesson = NewLesson {
            title: "Kinematics".to_string(),
        }
        .into_record(&course, 0, Utc::now())
        .unwrap();
        assert_eq!(lesson.tenant_id, course.tenant_id);
        assert_eq!(lesson.course_id, course.id);
    }
}
