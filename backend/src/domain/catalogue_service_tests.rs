//! Tests for the course catalogue service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockCourseRepository, MockEnrollmentRepository, MockUserRepository,
};
use crate::domain::test_fixtures::{actor, course_with_lessons, fixture_clock};
use crate::domain::{
    DisplayName, Email, ErrorCode, Role, User, UserDraft, UserId,
};

type Service =
    CourseCatalogueService<MockCourseRepository, MockEnrollmentRepository, MockUserRepository>;

fn make_service(
    courses: MockCourseRepository,
    enrollments: MockEnrollmentRepository,
    users: MockUserRepository,
) -> Service {
    CourseCatalogueService::new(
        Arc::new(courses),
        Arc::new(enrollments),
        Arc::new(users),
        fixture_clock(),
    )
}

fn courses_only(courses: MockCourseRepository) -> Service {
    make_service(
        courses,
        MockEnrollmentRepository::new(),
        MockUserRepository::new(),
    )
}

fn draft() -> CourseDraft {
    CourseDraft {
        title: "Intro to SQL".into(),
        description: "Queries and joins".into(),
        category: "Data".into(),
        ..CourseDraft::default()
    }
}

fn lesson() -> LessonDraft {
    LessonDraft {
        title: "Select".into(),
        content: "SELECT * FROM courses".into(),
        ..LessonDraft::default()
    }
}

#[tokio::test]
async fn create_course_assigns_actor_as_instructor() {
    let instructor = actor(Role::Instructor);
    let mut courses = MockCourseRepository::new();
    courses.expect_insert().times(1).return_once(|_| Ok(()));

    let course = courses_only(courses)
        .create_course(&instructor, draft())
        .await
        .expect("course created");

    assert_eq!(course.instructor(), instructor.id());
    assert_eq!(course.revision(), 1);
    assert!(course.lessons().is_empty());
}

#[tokio::test]
async fn create_course_is_forbidden_for_students() {
    let student = actor(Role::Student);
    let mut courses = MockCourseRepository::new();
    courses.expect_insert().times(0);

    let error = courses_only(courses)
        .create_course(&student, draft())
        .await
        .expect_err("students cannot author");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_course_reports_missing_fields() {
    let instructor = actor(Role::Instructor);
    let service = courses_only(MockCourseRepository::new());

    let error = service
        .create_course(
            &instructor,
            CourseDraft {
                title: "  ".into(),
                ..draft()
            },
        )
        .await
        .expect_err("blank title rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("title")
    );
}

#[tokio::test]
async fn update_course_saves_with_previous_revision() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 0, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_save()
        .withf(|course, expected| *expected == 1 && course.revision() == 2)
        .times(1)
        .return_once(|_, _| Ok(()));

    let updated = courses_only(courses)
        .update_course(
            &instructor,
            &id,
            CoursePatch {
                title: Some("Advanced Rust".into()),
                ..CoursePatch::default()
            },
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.title(), "Advanced Rust");
}

#[tokio::test]
async fn update_course_by_non_owner_is_forbidden() {
    let owner = actor(Role::Instructor);
    let other = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 0, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses.expect_save().times(0);

    let error = courses_only(courses)
        .update_course(
            &other,
            &id,
            CoursePatch {
                price: Some(10.0),
                ..CoursePatch::default()
            },
        )
        .await
        .expect_err("non-owner rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_may_update_any_course() {
    let owner = actor(Role::Instructor);
    let admin = actor(Role::Admin);
    let course = course_with_lessons(owner.id(), 0, false);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses.expect_save().times(1).return_once(|_, _| Ok(()));

    let updated = courses_only(courses)
        .update_course(
            &admin,
            &id,
            CoursePatch {
                published: Some(true),
                ..CoursePatch::default()
            },
        )
        .await
        .expect("admin update succeeds");

    assert!(updated.published());
    assert_eq!(updated.instructor(), owner.id());
}

#[tokio::test]
async fn update_course_maps_revision_mismatch_to_conflict() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 0, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses.expect_save().return_once(|_, _| {
        Err(CourseRepositoryError::revision_mismatch(1_u32, 2_u32))
    });

    let error = courses_only(courses)
        .update_course(
            &instructor,
            &id,
            CoursePatch {
                category: Some("Systems".into()),
                ..CoursePatch::default()
            },
        )
        .await
        .expect_err("stale write rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_missing_course_is_not_found() {
    let instructor = actor(Role::Instructor);
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().return_once(|_| Ok(None));

    let error = courses_only(courses)
        .update_course(&instructor, &CourseId::random(), CoursePatch::default())
        .await
        .expect_err("missing course");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_course_removes_course_and_enrollments() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 2, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_delete_with_enrollments()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .return_once(|_| Ok(true));

    courses_only(courses)
        .delete_course(&instructor, &id)
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn delete_course_reports_race_as_not_found() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 0, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_delete_with_enrollments()
        .return_once(|_| Ok(false));

    let error = courses_only(courses)
        .delete_course(&instructor, &id)
        .await
        .expect_err("already gone");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_lesson_appends_with_next_order() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 2, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    courses
        .expect_save()
        .withf(|_, expected| *expected == 3)
        .times(1)
        .return_once(|_, _| Ok(()));

    let updated = courses_only(courses)
        .add_lesson(&instructor, &id, lesson())
        .await
        .expect("lesson added");

    assert_eq!(updated.lesson_count(), 3);
    assert_eq!(updated.lessons()[2].order(), 2);
}

#[tokio::test]
async fn add_lesson_by_student_is_forbidden() {
    let owner = actor(Role::Instructor);
    let student = actor(Role::Student);
    let course = course_with_lessons(owner.id(), 1, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));

    let error = courses_only(courses)
        .add_lesson(&student, &id, lesson())
        .await
        .expect_err("student rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn list_published_maps_connection_errors() {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_list_published()
        .return_once(|_| Err(CourseRepositoryError::connection("pool exhausted")));

    let error = courses_only(courses)
        .list_published(&CourseFilter::default())
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

fn named_user(id: &UserId, name: &str) -> User {
    User::new(UserDraft {
        id: id.clone(),
        name: DisplayName::new(name).expect("valid name"),
        email: Email::new("ada@example.com").expect("valid email"),
        role: Role::Instructor,
        avatar: String::new(),
        bio: String::new(),
        created_at: crate::domain::test_fixtures::fixture_timestamp(),
    })
}

#[tokio::test]
async fn course_detail_joins_instructor_and_roster() {
    let instructor = actor(Role::Instructor);
    let course = course_with_lessons(instructor.id(), 1, true);
    let id = course.id();
    let learner = UserId::random();
    let roster = vec![learner.clone()];
    let owner = named_user(instructor.id(), "Ada Lovelace");

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments
        .expect_roster()
        .times(1)
        .return_once(move |_| Ok(roster));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(owner)));

    let detail = make_service(courses, enrollments, users)
        .course_detail(None, &id)
        .await
        .expect("detail loads");

    assert_eq!(detail.instructor_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(detail.enrolled_students, vec![learner]);
}

#[tokio::test]
async fn draft_course_is_hidden_from_other_viewers() {
    let owner = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 0, false);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));

    let error = courses_only(courses)
        .course_detail(Some(actor(Role::Student)), &id)
        .await
        .expect_err("draft hidden");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn draft_course_is_visible_to_owner() {
    let owner = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 0, false);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_roster().return_once(|_| Ok(Vec::new()));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let detail = make_service(courses, enrollments, users)
        .course_detail(Some(owner), &id)
        .await
        .expect("owner sees draft");

    assert!(!detail.course.published());
    assert!(detail.instructor_name.is_none());
}

#[tokio::test]
async fn list_authored_requires_authoring_role() {
    let error = courses_only(MockCourseRepository::new())
        .list_authored(&actor(Role::Student))
        .await
        .expect_err("students author nothing");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}
