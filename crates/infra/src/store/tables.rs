use std::sync::Arc;

use learnhub_core::{AssessmentId, ClassId, CourseId, LessonId, NoticeId, SubjectId, UserId};
use learnhub_learning::{
    AssessmentRecord, ClassRecord, ClassSubjectRecord, CourseRecord, LessonRecord, NoticeRecord,
    ParentLink, ProgressRecord, StudentProfile, SubjectRecord, SubmissionRecord, UserRecord,
};

use super::{InMemoryTenantStore, TenantStore};

pub type Table<K, V> = Arc<dyn TenantStore<K, V>>;

/// Every table of the learning platform.
///
/// Natural keys carry the storage-level unique constraints: one submission per
/// (assessment, student), one progress row per (student, lesson), one mapping
/// per (class, subject), one link per (parent, student).
#[derive(Clone)]
pub struct LmsStore {
    pub users: Table<UserId, UserRecord>,
    pub student_profiles: Table<UserId, StudentProfile>,
    pub parent_links: Table<(UserId, UserId), ParentLink>,
    pub classes: Table<ClassId, ClassRecord>,
    pub subjects: Table<SubjectId, SubjectRecord>,
    pub class_subjects: Table<(ClassId, SubjectId), ClassSubjectRecord>,
    pub courses: Table<CourseId, CourseRecord>,
    pub lessons: Table<LessonId, LessonRecord>,
    pub assessments: Table<AssessmentId, AssessmentRecord>,
    pub submissions: Table<(AssessmentId, UserId), SubmissionRecord>,
    pub progress: Table<(UserId, LessonId), ProgressRecord>,
    pub notices: Table<NoticeId, NoticeRecord>,
}

impl LmsStore {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryTenantStore::new()),
            student_profiles: Arc::new(InMemoryTenantStore::new()),
            parent_links: Arc::new(InMemoryTenantStore::new()),
            classes: Arc::new(InMemoryTenantStore::new()),
            subjects: Arc::new(InMemoryTenantStore::new()),
            class_subjects: Arc::new(InMemoryTenantStore::new()),
            courses: Arc::new(InMemoryTenantStore::new()),
            lessons: Arc::new(InMemoryTenantStore::new()),
            assessments: Arc::new(InMemoryTenantStore::new()),
            submissions: Arc::new(InMemoryTenantStore::new()),
            progress: Arc::new(InMemoryTenantStore::new()),
            notices: Arc::new(InMemoryTenantStore::new()),
        }
    }
}

impl Default for LmsStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for LmsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmsStore").finish_non_exhaustive()
    }
}
