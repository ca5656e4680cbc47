//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, AccountQuery, ContentAssist, CourseCommand, CourseQuery, CourseRepository,
    EnrollmentCommand, EnrollmentQuery, EnrollmentRepository, PasswordHasher, ProgressCommand,
    ProgressQuery, TextGenerator, UserRepository,
};
use crate::domain::{
    AccountService, ContentAssistService, CourseCatalogueService, EnrollmentService,
    ProgressService,
};

/// Driven adapters the HTTP state is assembled from.
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub generator: Arc<dyn TextGenerator>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use edumaster::domain::ports::{DisabledTextGenerator, FixturePasswordHasher};
/// use edumaster::inbound::http::state::{HttpState, HttpStatePorts};
/// use edumaster::outbound::memory::InMemoryStore;
/// use mockable::DefaultClock;
///
/// let store = Arc::new(InMemoryStore::new());
/// let state = HttpState::from_ports(HttpStatePorts {
///     users: store.clone(),
///     courses: store.clone(),
///     enrollments: store,
///     hasher: Arc::new(FixturePasswordHasher),
///     generator: Arc::new(DisabledTextGenerator),
///     clock: Arc::new(DefaultClock),
/// });
/// let _catalogue = state.catalogue.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn AccountQuery>,
    pub courses: Arc<dyn CourseCommand>,
    pub catalogue: Arc<dyn CourseQuery>,
    pub enrollments: Arc<dyn EnrollmentCommand>,
    pub enrolled: Arc<dyn EnrollmentQuery>,
    pub progress: Arc<dyn ProgressCommand>,
    pub progress_query: Arc<dyn ProgressQuery>,
    pub content: Arc<dyn ContentAssist>,
}

impl HttpState {
    /// Wire the domain services over a set of driven adapters.
    pub fn from_ports(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            courses,
            enrollments,
            hasher,
            generator,
            clock,
        } = ports;

        let accounts = Arc::new(AccountService::new(users.clone(), hasher, clock.clone()));
        let catalogue = Arc::new(CourseCatalogueService::new(
            courses.clone(),
            enrollments.clone(),
            users,
            clock.clone(),
        ));
        let enrollment = Arc::new(EnrollmentService::new(
            courses.clone(),
            enrollments.clone(),
            clock.clone(),
        ));
        let progress = Arc::new(ProgressService::new(courses, enrollments, clock));

        Self {
            accounts: accounts.clone(),
            profiles: accounts,
            courses: catalogue.clone(),
            catalogue,
            enrollments: enrollment.clone(),
            enrolled: enrollment,
            progress: progress.clone(),
            progress_query: progress,
            content: Arc::new(ContentAssistService::new(generator)),
        }
    }
}
