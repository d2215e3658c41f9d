//! Learning domain module.
//!
//! Records and state machines for the learning platform, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage). Access control
//! is applied by the repositories in `learnhub-infra`.

pub mod assessment;
pub mod course;
pub mod notice;
pub mod progress;
pub mod structure;
pub mod user;

pub use assessment::{
    AssessmentRecord, AssessmentType, AssessmentView, AttemptState, AttemptView, NewAssessment,
    NewQuestion, Question, StudentQuestionView, SubmissionRecord, grade,
};
pub use course::{CourseRecord, LessonRecord, NewCourse, NewLesson};
pub use notice::{NewNotice, NoticeCategory, NoticePatch, NoticeRecord};
pub use progress::{ProgressRecord, ProgressStatus, Transition, advance};
pub use structure::{ClassRecord, ClassSubjectRecord, SubjectRecord, name_key, normalize_name};
pub use user::{ParentLink, StudentProfile, UserRecord};
