//! Tests for lesson progress recompute and completion transitions.

use super::*;
use crate::domain::course::{CourseDraft, LessonDraft};
use chrono::TimeZone;
use rstest::{fixture, rstest};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn lesson(n: usize) -> LessonDraft {
    LessonDraft {
        title: format!("Lesson {n}"),
        content: "Body".into(),
        ..LessonDraft::default()
    }
}

fn course_with_lessons(count: usize) -> Course {
    let mut course = Course::create(
        CourseId::random(),
        UserId::random(),
        CourseDraft {
            title: "Data structures".into(),
            description: "Lists and trees".into(),
            category: "Computer science".into(),
            ..CourseDraft::default()
        },
        at(0),
    )
    .expect("valid course");
    for n in 0..count {
        course.append_lesson(lesson(n), at(0)).expect("valid lesson");
    }
    course
}

#[fixture]
fn four_lessons() -> Course {
    course_with_lessons(4)
}

fn enrolled(course: &Course) -> Progress {
    Progress::enroll(UserId::random(), course.id(), at(1))
}

fn complete(index: u32) -> LessonUpdate {
    LessonUpdate {
        lesson_index: index,
        completed: true,
        quiz: None,
    }
}

fn uncomplete(index: u32) -> LessonUpdate {
    LessonUpdate {
        lesson_index: index,
        completed: false,
        quiz: None,
    }
}

#[rstest]
#[case(0, 0, 0)]
#[case(0, 4, 0)]
#[case(1, 3, 33)]
#[case(2, 3, 67)]
#[case(1, 8, 13)]
#[case(2, 4, 50)]
#[case(2, 5, 40)]
#[case(3, 3, 100)]
#[case(7, 3, 100)]
fn completion_percentage_rounds_half_up(
    #[case] completed: u32,
    #[case] total: u32,
    #[case] expected: u8,
) {
    assert_eq!(completion_percentage(completed, total), expected);
}

#[rstest]
fn fresh_enrollment_starts_empty(four_lessons: Course) {
    let progress = enrolled(&four_lessons);
    assert_eq!(progress.progress(), 0);
    assert!(progress.completed_lessons().is_empty());
    assert!(!progress.completed());
    assert!(progress.completed_at().is_none());
    assert_eq!(progress.last_accessed_lesson(), 0);
}

#[rstest]
fn completing_every_lesson_marks_course_complete(four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    for index in 0..4 {
        progress
            .record_lesson(&four_lessons, &complete(index), at(2))
            .expect("in range");
    }
    assert_eq!(progress.progress(), 100);
    assert!(progress.completed());
    assert_eq!(progress.completed_at(), Some(at(2)));

    progress
        .record_lesson(&four_lessons, &uncomplete(1), at(3))
        .expect("in range");
    assert_eq!(progress.progress(), 75);
    assert!(!progress.completed());
    assert!(progress.completed_at().is_none());
}

#[rstest]
fn re_marking_a_completed_lesson_is_idempotent(four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    progress
        .record_lesson(&four_lessons, &complete(2), at(2))
        .expect("in range");
    let before = (progress.completed_lessons().len(), progress.progress());

    progress
        .record_lesson(&four_lessons, &complete(2), at(3))
        .expect("in range");
    assert_eq!(
        (progress.completed_lessons().len(), progress.progress()),
        before
    );
    assert_eq!(progress.last_accessed(), at(3));
}

#[rstest]
fn un_marking_an_absent_lesson_is_not_an_error(four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    progress
        .record_lesson(&four_lessons, &uncomplete(3), at(2))
        .expect("absent lessons can be cleared");
    assert_eq!(progress.progress(), 0);
    assert_eq!(progress.last_accessed_lesson(), 3);
}

#[rstest]
#[case(4)]
#[case(9999)]
fn out_of_range_lessons_are_rejected(four_lessons: Course, #[case] index: u32) {
    let mut progress = enrolled(&four_lessons);
    let before = progress.clone();
    let err = progress
        .record_lesson(&four_lessons, &complete(index), at(2))
        .expect_err("out of range");
    assert_eq!(
        err,
        ProgressValidationError::LessonOutOfRange { index, total: 4 }
    );
    assert_eq!(progress, before);
}

#[rstest]
fn courses_without_lessons_reject_every_index() {
    let empty = course_with_lessons(0);
    let mut progress = enrolled(&empty);
    assert!(progress.record_lesson(&empty, &complete(0), at(2)).is_err());
    assert_eq!(progress.progress(), 0);
}

#[rstest]
fn denominator_follows_the_live_lesson_count(mut four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    for index in [0, 2] {
        progress
            .record_lesson(&four_lessons, &complete(index), at(2))
            .expect("in range");
    }
    assert_eq!(progress.progress(), 50);

    four_lessons
        .append_lesson(lesson(4), at(3))
        .expect("valid lesson");
    progress
        .record_lesson(&four_lessons, &complete(2), at(4))
        .expect("in range");
    assert_eq!(progress.progress(), 40);
}

#[rstest]
fn quiz_scores_are_appended(four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    let quiz = QuizSubmission::new(8, 10).expect("valid quiz");
    for minute in [2, 3] {
        progress
            .record_lesson(
                &four_lessons,
                &LessonUpdate {
                    lesson_index: 1,
                    completed: true,
                    quiz: Some(quiz),
                },
                at(minute),
            )
            .expect("in range");
    }

    assert_eq!(progress.quiz_scores().len(), 2);
    assert_eq!(progress.quiz_scores()[1].completed_at, at(3));
    assert_eq!(progress.quiz_scores()[0].lesson_index, 1);
}

#[rstest]
#[case(1, 0, ProgressValidationError::EmptyQuiz)]
#[case(11, 10, ProgressValidationError::ScoreExceedsQuestions { score: 11, total_questions: 10 })]
fn invalid_quiz_submissions_are_rejected(
    #[case] score: u32,
    #[case] total: u32,
    #[case] expected: ProgressValidationError,
) {
    assert_eq!(QuizSubmission::new(score, total), Err(expected));
}

#[rstest]
fn each_update_bumps_revision(four_lessons: Course) {
    let mut progress = enrolled(&four_lessons);
    assert_eq!(progress.revision(), 1);
    progress
        .record_lesson(&four_lessons, &complete(0), at(2))
        .expect("in range");
    assert_eq!(progress.revision(), 2);
}
