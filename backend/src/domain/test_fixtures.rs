//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Actor, Course, CourseDraft, CourseId, LessonDraft, Role, UserId};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn actor(role: Role) -> Actor {
    Actor::new(UserId::random(), role)
}

/// A course owned by `instructor` with `lessons` numbered lessons.
pub(crate) fn course_with_lessons(instructor: &UserId, lessons: u32, published: bool) -> Course {
    let mut course = Course::create(
        CourseId::random(),
        instructor.clone(),
        CourseDraft {
            title: "Rust basics".into(),
            description: "Ownership and borrowing".into(),
            category: "Programming".into(),
            published: Some(published),
            ..CourseDraft::default()
        },
        fixture_timestamp(),
    )
    .expect("valid course draft");
    for n in 0..lessons {
        course
            .append_lesson(
                LessonDraft {
                    title: format!("Lesson {n}"),
                    content: "Body".into(),
                    ..LessonDraft::default()
                },
                fixture_timestamp(),
            )
            .expect("valid lesson draft");
    }
    course
}
