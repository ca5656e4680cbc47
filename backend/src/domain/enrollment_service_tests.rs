//! Tests for the enrollment service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockCourseRepository, MockEnrollmentRepository};
use crate::domain::test_fixtures::{actor, course_with_lessons, fixture_clock, fixture_timestamp};
use crate::domain::{ErrorCode, Role};

fn make_service(
    courses: MockCourseRepository,
    enrollments: MockEnrollmentRepository,
) -> EnrollmentService<MockCourseRepository, MockEnrollmentRepository> {
    EnrollmentService::new(Arc::new(courses), Arc::new(enrollments), fixture_clock())
}

#[tokio::test]
async fn enroll_creates_fresh_progress() {
    let owner = actor(Role::Instructor);
    let student = actor(Role::Student);
    let course = course_with_lessons(owner.id(), 4, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments
        .expect_create()
        .withf(|progress| progress.progress() == 0 && progress.completed_lessons().is_empty())
        .times(1)
        .return_once(|_| Ok(()));

    let progress = make_service(courses, enrollments)
        .enroll(&student, &id)
        .await
        .expect("enrollment succeeds");

    assert_eq!(progress.user_id(), student.id());
    assert_eq!(progress.course_id(), id);
    assert_eq!(progress.enrolled_at(), fixture_timestamp());
    assert!(!progress.completed());
}

#[tokio::test]
async fn enroll_in_missing_course_is_not_found() {
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().return_once(|_| Ok(None));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_create().times(0);

    let error = make_service(courses, enrollments)
        .enroll(&actor(Role::Student), &CourseId::random())
        .await
        .expect_err("missing course");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn enroll_in_own_course_breaks_business_rule() {
    let owner = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 1, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_create().times(0);

    let error = make_service(courses, enrollments)
        .enroll(&owner, &id)
        .await
        .expect_err("self enrollment rejected");

    assert_eq!(error.code(), ErrorCode::BusinessRuleViolation);
    assert_eq!(error.rule(), Some(SELF_ENROLLMENT_RULE));
}

#[tokio::test]
async fn duplicate_enrollment_breaks_business_rule() {
    let owner = actor(Role::Instructor);
    let student = actor(Role::Student);
    let course = course_with_lessons(owner.id(), 1, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_create().return_once(move |progress| {
        Err(EnrollmentRepositoryError::duplicate(
            progress.user_id().to_string(),
            progress.course_id().to_string(),
        ))
    });

    let error = make_service(courses, enrollments)
        .enroll(&student, &id)
        .await
        .expect_err("duplicate rejected");

    assert_eq!(error.code(), ErrorCode::BusinessRuleViolation);
    assert_eq!(error.rule(), Some(ALREADY_ENROLLED_RULE));
}

#[tokio::test]
async fn course_deleted_mid_flight_is_not_found() {
    let owner = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 1, true);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments
        .expect_create()
        .return_once(move |_| Err(EnrollmentRepositoryError::course_missing(id.to_string())));

    let error = make_service(courses, enrollments)
        .enroll(&actor(Role::Student), &id)
        .await
        .expect_err("course vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn draft_course_cannot_be_enrolled_by_students() {
    let owner = actor(Role::Instructor);
    let course = course_with_lessons(owner.id(), 1, false);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_create().times(0);

    let error = make_service(courses, enrollments)
        .enroll(&actor(Role::Student), &id)
        .await
        .expect_err("draft hidden");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn admin_can_enroll_in_another_instructors_draft() {
    let owner = actor(Role::Instructor);
    let admin = actor(Role::Admin);
    let course = course_with_lessons(owner.id(), 1, false);
    let id = course.id();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(course)));
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments.expect_create().times(1).return_once(|_| Ok(()));

    let progress = make_service(courses, enrollments)
        .enroll(&admin, &id)
        .await
        .expect("admins see drafts");

    assert_eq!(progress.user_id(), admin.id());
    assert_eq!(progress.course_id(), id);
}

#[tokio::test]
async fn enrolled_courses_passes_through_projection() {
    let user = UserId::random();
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments
        .expect_list_enrolled_courses()
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let listed = make_service(MockCourseRepository::new(), enrollments)
        .enrolled_courses(&user)
        .await
        .expect("list succeeds");

    assert!(listed.is_empty());
}

#[tokio::test]
async fn enrolled_courses_maps_connection_failure() {
    let mut enrollments = MockEnrollmentRepository::new();
    enrollments
        .expect_list_enrolled_courses()
        .return_once(|_| Err(EnrollmentRepositoryError::connection("refused")));

    let error = make_service(MockCourseRepository::new(), enrollments)
        .enrolled_courses(&UserId::random())
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
