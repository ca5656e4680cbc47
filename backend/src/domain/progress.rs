//! Per-enrollment progress record and the completion recompute rules.
//!
//! One record exists per (user, course) pair; it is the enrollment itself.
//! Completion percentage is always derived from the course's *current* lesson
//! count, so appending lessons lowers the percentage of existing learners.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::{Course, CourseId};
use super::user::UserId;

/// Validation errors raised while recording lesson progress.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressValidationError {
    #[error("lesson index {index} is out of range for a course with {total} lessons")]
    LessonOutOfRange { index: u32, total: u32 },
    #[error("quiz must have at least one question")]
    EmptyQuiz,
    #[error("quiz score {score} exceeds {total_questions} questions")]
    ScoreExceedsQuestions { score: u32, total_questions: u32 },
}

/// Compute `round(100 * completed / total)` with halves rounded up.
///
/// Returns 0 when the course has no lessons and never exceeds 100.
///
/// # Examples
/// ```
/// use edumaster::domain::completion_percentage;
///
/// assert_eq!(completion_percentage(1, 3), 33);
/// assert_eq!(completion_percentage(2, 3), 67);
/// assert_eq!(completion_percentage(0, 0), 0);
/// ```
pub fn completion_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Quiz answers submitted alongside a lesson update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSubmission {
    score: u32,
    total_questions: u32,
}

impl QuizSubmission {
    pub fn new(score: u32, total_questions: u32) -> Result<Self, ProgressValidationError> {
        if total_questions == 0 {
            return Err(ProgressValidationError::EmptyQuiz);
        }
        if score > total_questions {
            return Err(ProgressValidationError::ScoreExceedsQuestions {
                score,
                total_questions,
            });
        }
        Ok(Self {
            score,
            total_questions,
        })
    }
}

/// Stored quiz result. Entries are append-only and may repeat per lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub lesson_index: u32,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

/// A single lesson-completion update requested by a learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonUpdate {
    pub lesson_index: u32,
    pub completed: bool,
    pub quiz: Option<QuizSubmission>,
}

/// Enrollment progress for one user in one course.
///
/// ## Invariants
/// - `progress` is in `0..=100`.
/// - `completed` is true exactly when `progress == 100`, and `completed_at`
///   is set exactly when `completed` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    user_id: UserId,
    course_id: CourseId,
    completed_lessons: BTreeSet<u32>,
    last_accessed_lesson: u32,
    progress: u8,
    quiz_scores: Vec<QuizScore>,
    enrolled_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    revision: u32,
}

/// Persisted progress state used to rebuild the record from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub completed_lessons: BTreeSet<u32>,
    pub last_accessed_lesson: u32,
    pub progress: u8,
    pub quiz_scores: Vec<QuizScore>,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub revision: u32,
}

impl Progress {
    /// Start tracking a fresh enrollment with nothing completed.
    pub fn enroll(user_id: UserId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            completed_lessons: BTreeSet::new(),
            last_accessed_lesson: 0,
            progress: 0,
            quiz_scores: Vec::new(),
            enrolled_at: now,
            last_accessed: now,
            completed: false,
            completed_at: None,
            revision: 1,
        }
    }

    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        let ProgressSnapshot {
            user_id,
            course_id,
            completed_lessons,
            last_accessed_lesson,
            progress,
            quiz_scores,
            enrolled_at,
            last_accessed,
            completed,
            completed_at,
            revision,
        } = snapshot;
        Self {
            user_id,
            course_id,
            completed_lessons,
            last_accessed_lesson,
            progress: progress.min(100),
            quiz_scores,
            enrolled_at,
            last_accessed,
            completed,
            completed_at,
            revision,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn completed_lessons(&self) -> &BTreeSet<u32> {
        &self.completed_lessons
    }

    pub fn last_accessed_lesson(&self) -> u32 {
        self.last_accessed_lesson
    }

    /// Completion percentage, 0 to 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn quiz_scores(&self) -> &[QuizScore] {
        &self.quiz_scores
    }

    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Optimistic concurrency token; bumped on every recorded update.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Apply a lesson update against the course's current lesson list.
    ///
    /// Validation happens before any field changes, so a rejected update
    /// leaves the record untouched.
    pub fn record_lesson(
        &mut self,
        course: &Course,
        update: &LessonUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ProgressValidationError> {
        let total = course.lesson_count();
        let index = update.lesson_index;
        if index >= total {
            return Err(ProgressValidationError::LessonOutOfRange { index, total });
        }

        if update.completed {
            self.completed_lessons.insert(index);
        } else {
            self.completed_lessons.remove(&index);
        }
        self.last_accessed_lesson = index;
        self.last_accessed = now;

        if let Some(quiz) = update.quiz {
            self.quiz_scores.push(QuizScore {
                lesson_index: index,
                score: quiz.score,
                total_questions: quiz.total_questions,
                completed_at: now,
            });
        }

        self.recompute(total, now);
        self.revision = self.revision.saturating_add(1);
        Ok(())
    }

    fn recompute(&mut self, total: u32, now: DateTime<Utc>) {
        let in_range = self.completed_lessons.range(..total).count();
        let in_range = u32::try_from(in_range).unwrap_or(u32::MAX);
        self.progress = completion_percentage(in_range, total);

        if self.progress == 100 && !self.completed {
            self.completed = true;
            self.completed_at = Some(now);
        } else if self.progress < 100 && self.completed {
            self.completed = false;
            self.completed_at = None;
        }
    }
}

/// Progress joined with the course display fields at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub progress: Progress,
    pub course_title: String,
    pub course_thumbnail: Option<String>,
    pub instructor_name: String,
}

/// A course the user is enrolled in, with their headline progress.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub course: Course,
    pub progress: u8,
    pub last_accessed: DateTime<Utc>,
}

#[cfg(test)]
mod tests;
