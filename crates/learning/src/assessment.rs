//! Assessments: authoring rules, the per-student attempt state machine and
//! deterministic auto-grading.
//!
//! ```text
//! NOT_ATTEMPTED --submit--> SUBMITTED (terminal)
//! ```
//!
//! Question order is fixed at creation time and never changes, so a score can
//! always be recomputed from the stored answer array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_core::{
    AssessmentId, CourseId, DomainError, DomainResult, QuestionId, SubmissionId, TenantId,
    UserId,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    Quiz,
    Exam,
    Assignment,
}

/// A multiple-choice question as stored (includes the answer key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

/// Question input from a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option_index: i64,
}

impl NewQuestion {
    fn into_question(self, position: usize) -> DomainResult<Question> {
        let text = self.question_text.trim();
        if text.is_empty() {
            return Err(DomainError::validation(format!(
                "question {position}: text cannot be empty"
            )));
        }
        if self.options.len() < 2 {
            return Err(DomainError::validation(format!(
                "question {position}: at least 2 options are required"
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "question {position}: options cannot be empty"
            )));
        }
        let correct = usize::try_from(self.correct_option_index)
            .ok()
            .filter(|&i| i < self.options.len())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "question {position}: correctOptionIndex {} is out of bounds",
                    self.correct_option_index
                ))
            })?;

        Ok(Question {
            id: QuestionId::new(),
            question_text: text.to_string(),
            options: self.options.into_iter().map(|o| o.trim().to_string()).collect(),
            correct_option_index: correct,
        })
    }
}

/// Assessment input from a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    pub course_id: CourseId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub questions: Vec<NewQuestion>,
}

impl NewAssessment {
    pub fn into_record(
        self,
        tenant_id: TenantId,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<AssessmentRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("assessment title cannot be empty"));
        }
        if self.questions.is_empty() {
            return Err(DomainError::validation("at least one question is required"));
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| q.into_question(i + 1))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(AssessmentRecord {
            id: AssessmentId::new(),
            tenant_id,
            course_id: self.course_id,
            title: title.to_string(),
            kind: self.kind,
            due_date: self.due_date,
            questions,
            created_by,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub tenant_id: TenantId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub due_date: Option<DateTime<Utc>>,
    /// Creation order; grading depends on it.
    pub questions: Vec<Question>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    fn student_questions(&self) -> Vec<StudentQuestionView> {
        self.questions
            .iter()
            .map(|q| StudentQuestionView {
                id: q.id,
                question_text: q.question_text.clone(),
                options: q.options.clone(),
            })
            .collect()
    }

    /// View for staff: includes the answer key.
    pub fn staff_view(&self) -> AssessmentView {
        AssessmentView {
            answer_key: Some(self.questions.iter().map(|q| q.correct_option_index).collect()),
            ..self.redacted_view()
        }
    }

    /// View for students and parents: no answer key.
    pub fn redacted_view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id,
            course_id: self.course_id,
            title: self.title.clone(),
            kind: self.kind,
            due_date: self.due_date,
            question_count: self.question_count(),
            questions: self.student_questions(),
            answer_key: None,
            created_at: self.created_at,
        }
    }

    /// View for a student about to attempt (or having attempted) the assessment.
    pub fn attempt_view(&self, submission: Option<&SubmissionRecord>) -> AttemptView {
        AttemptView {
            assessment_id: self.id,
            course_id: self.course_id,
            title: self.title.clone(),
            kind: self.kind,
            due_date: self.due_date,
            questions: self.student_questions(),
            state: AttemptState::of(submission),
            score: submission.map(|s| s.score),
            max_score: self.question_count() as u32,
            submitted_at: submission.map(|s| s.submitted_at),
        }
    }
}

/// A question without its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuestionView {
    pub id: QuestionId,
    pub question_text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub due_date: Option<DateTime<Utc>>,
    pub question_count: usize,
    pub questions: Vec<StudentQuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<Vec<usize>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub assessment_id: AssessmentId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub due_date: Option<DateTime<Utc>>,
    pub questions: Vec<StudentQuestionView>,
    pub state: AttemptState,
    pub score: Option<u32>,
    pub max_score: u32,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Attempt state per (assessment, student).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptState {
    NotAttempted,
    Submitted,
}

impl AttemptState {
    pub fn of(submission: Option<&SubmissionRecord>) -> Self {
        match submission {
            Some(_) => AttemptState::Submitted,
            None => AttemptState::NotAttempted,
        }
    }

    /// The only transition. `SUBMITTED` is terminal.
    pub fn submit(self) -> DomainResult<AttemptState> {
        match self {
            AttemptState::NotAttempted => Ok(AttemptState::Submitted),
            AttemptState::Submitted => Err(DomainError::conflict(
                "assessment has already been submitted",
            )),
        }
    }
}

/// Number of answers equal to the question's correct option, position by position.
pub fn grade(questions: &[Question], answers: &[i64]) -> DomainResult<u32> {
    if answers.len() != questions.len() {
        return Err(DomainError::validation(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }

    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| usize::try_from(**a).is_ok_and(|a| a == q.correct_option_index))
        .count();

    Ok(correct as u32)
}

/// An immutable, auto-graded submission. At most one per (assessment, student).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub tenant_id: TenantId,
    pub assessment_id: AssessmentId,
    pub student_id: UserId,
    pub answers: Vec<i64>,
    pub score: u32,
    pub max_score: u32,
    pub status: AttemptState,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Apply the submit transition and grade the answers.
    pub fn submit(
        assessment: &AssessmentRecord,
        student_id: UserId,
        answers: Vec<i64>,
        current: AttemptState,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let status = current.submit()?;
        let score = grade(&assessment.questions, &answers)?;
        Ok(Self {
            id: SubmissionId::new(),
            tenant_id: assessment.tenant_id,
            assessment_id: assessment.id,
            student_id,
            answers,
            score,
            max_score: assessment.question_count() as u32,
            status,
            submitted_at: now,
        })
    }
}
