//! Process-local repositories sharing one store.
//!
//! [`InMemoryStore`] implements the user, course, and enrollment ports over a
//! single mutex-guarded state so cross-table rules hold: one enrollment per
//! (user, course) pair, enrollments referencing an existing course, and
//! course deletion removing its enrollments. Used when the server runs
//! without a database and by the behavioural tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CourseRepository, CourseRepositoryError, EnrollmentRepository, EnrollmentRepositoryError,
    StoredAccount, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Course, CourseFilter, CourseId, Email, EnrolledCourse, Progress, ProgressOverview, User,
    UserId,
};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<UserId, StoredAccount>,
    courses: HashMap<CourseId, Course>,
    /// Kept in enrollment order.
    enrollments: Vec<Progress>,
}

impl MemoryState {
    fn enrollment_position(&self, user_id: &UserId, course_id: CourseId) -> Option<usize> {
        self.enrollments
            .iter()
            .position(|record| record.user_id() == user_id && record.course_id() == course_id)
    }

    fn instructor_name(&self, course: &Course) -> String {
        self.accounts
            .get(course.instructor())
            .map(|account| account.user.name().to_string())
            .unwrap_or_default()
    }
}

/// Shared in-memory store; clones see the same data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, MemoryState>, E> {
        self.state.lock().map_err(|_| poisoned(POISONED))
    }
}

fn newest_first(courses: &mut [Course]) {
    courses.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &StoredAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let email = account.user.email();
        if state
            .accounts
            .values()
            .any(|existing| existing.user.email() == email)
        {
            return Err(UserPersistenceError::duplicate_email(email.to_string()));
        }
        state
            .accounts
            .insert(account.user.id().clone(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.accounts.get(id).map(|account| account.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state
            .accounts
            .values()
            .find(|account| account.user.email() == email)
            .cloned())
    }

    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let account = state.accounts.get_mut(user.id()).ok_or_else(|| {
            UserPersistenceError::query(format!("user {} not found for update", user.id()))
        })?;
        account.user = user.clone();
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        if state.courses.contains_key(&course.id()) {
            return Err(CourseRepositoryError::query("course identifier already exists"));
        }
        state.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        Ok(state.courses.get(id).cloned())
    }

    async fn list_published(
        &self,
        filter: &CourseFilter,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|course| filter.matches(course))
            .cloned()
            .collect();
        newest_first(&mut courses);
        Ok(courses)
    }

    async fn list_by_instructor(
        &self,
        instructor: &UserId,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let state = self.lock(CourseRepositoryError::query)?;
        let mut courses: Vec<Course> = state
            .courses
            .values()
            .filter(|course| course.instructor() == instructor)
            .cloned()
            .collect();
        newest_first(&mut courses);
        Ok(courses)
    }

    async fn save(
        &self,
        course: &Course,
        expected_revision: u32,
    ) -> Result<(), CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        let stored = state
            .courses
            .get_mut(&course.id())
            .ok_or_else(|| CourseRepositoryError::missing(course.id().to_string()))?;
        if stored.revision() != expected_revision {
            return Err(CourseRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = course.clone();
        Ok(())
    }

    async fn delete_with_enrollments(&self, id: &CourseId) -> Result<bool, CourseRepositoryError> {
        let mut state = self.lock(CourseRepositoryError::query)?;
        if state.courses.remove(id).is_none() {
            return Ok(false);
        }
        state.enrollments.retain(|record| record.course_id() != *id);
        Ok(true)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn create(&self, progress: &Progress) -> Result<(), EnrollmentRepositoryError> {
        let mut state = self.lock(EnrollmentRepositoryError::query)?;
        let course_id = progress.course_id();
        if !state.courses.contains_key(&course_id) {
            return Err(EnrollmentRepositoryError::course_missing(
                course_id.to_string(),
            ));
        }
        if state
            .enrollment_position(progress.user_id(), course_id)
            .is_some()
        {
            return Err(EnrollmentRepositoryError::duplicate(
                progress.user_id().to_string(),
                course_id.to_string(),
            ));
        }
        state.enrollments.push(progress.clone());
        Ok(())
    }

    async fn find(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Progress>, EnrollmentRepositoryError> {
        let state = self.lock(EnrollmentRepositoryError::query)?;
        Ok(state
            .enrollment_position(user_id, *course_id)
            .and_then(|index| state.enrollments.get(index))
            .cloned())
    }

    async fn save(
        &self,
        progress: &Progress,
        expected_revision: u32,
    ) -> Result<(), EnrollmentRepositoryError> {
        let mut state = self.lock(EnrollmentRepositoryError::query)?;
        let missing = || {
            EnrollmentRepositoryError::missing(
                progress.user_id().to_string(),
                progress.course_id().to_string(),
            )
        };
        let index = state
            .enrollment_position(progress.user_id(), progress.course_id())
            .ok_or_else(missing)?;
        let stored = state.enrollments.get_mut(index).ok_or_else(missing)?;
        if stored.revision() != expected_revision {
            return Err(EnrollmentRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = progress.clone();
        Ok(())
    }

    async fn list_overviews(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProgressOverview>, EnrollmentRepositoryError> {
        let state = self.lock(EnrollmentRepositoryError::query)?;
        let mut overviews: Vec<ProgressOverview> = state
            .enrollments
            .iter()
            .filter(|record| record.user_id() == user_id)
            .filter_map(|record| {
                let course = state.courses.get(&record.course_id())?;
                Some(ProgressOverview {
                    progress: record.clone(),
                    course_title: course.title().to_owned(),
                    course_thumbnail: course.thumbnail().map(str::to_owned),
                    instructor_name: state.instructor_name(course),
                })
            })
            .collect();
        overviews.sort_by(|left, right| {
            right
                .progress
                .last_accessed()
                .cmp(&left.progress.last_accessed())
        });
        Ok(overviews)
    }

    async fn list_enrolled_courses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentRepositoryError> {
        let state = self.lock(EnrollmentRepositoryError::query)?;
        Ok(state
            .enrollments
            .iter()
            .filter(|record| record.user_id() == user_id)
            .filter_map(|record| {
                state
                    .courses
                    .get(&record.course_id())
                    .map(|course| EnrolledCourse {
                        course: course.clone(),
                        progress: record.progress(),
                        last_accessed: record.last_accessed(),
                    })
            })
            .collect())
    }

    async fn roster(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<UserId>, EnrollmentRepositoryError> {
        let state = self.lock(EnrollmentRepositoryError::query)?;
        Ok(state
            .enrollments
            .iter()
            .filter(|record| record.course_id() == *course_id)
            .map(|record| record.user_id().clone())
            .collect())
    }
}
