//! Builders for the HTTP state from configured driven adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use edumaster::domain::ports::{
    CourseRepository, DisabledTextGenerator, EnrollmentRepository, TextGenerator, UserRepository,
};
use edumaster::inbound::http::state::{HttpState, HttpStatePorts};
use edumaster::outbound::memory::InMemoryStore;
use edumaster::outbound::password_hasher::Argon2PasswordHasher;
use edumaster::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselEnrollmentRepository, DieselUserRepository,
};
use edumaster::outbound::text_generation::HttpTextGenerator;

use super::ServerConfig;

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn CourseRepository>,
    Arc<dyn EnrollmentRepository>,
);

/// Select Diesel repositories when a pool is configured, otherwise a shared
/// in-memory store.
fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselCourseRepository::new(pool.clone())),
            Arc::new(DieselEnrollmentRepository::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; state is kept in memory and lost on restart");
            let store = Arc::new(InMemoryStore::new());
            (store.clone(), store.clone(), store)
        }
    }
}

fn build_text_generator(config: &ServerConfig) -> std::io::Result<Arc<dyn TextGenerator>> {
    match config.text_generation.clone() {
        Some(settings) => {
            info!(model = %settings.model, endpoint = %settings.endpoint, "AI content assist enabled");
            let generator = HttpTextGenerator::new(settings).map_err(|err| {
                std::io::Error::other(format!("text generation client failed: {err}"))
            })?;
            Ok(Arc::new(generator))
        }
        None => Ok(Arc::new(DisabledTextGenerator)),
    }
}

/// Assemble the handler state for the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let (users, courses, enrollments) = build_repositories(config.db_pool.as_ref());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = HttpState::from_ports(HttpStatePorts {
        users,
        courses,
        enrollments,
        hasher: Arc::new(Argon2PasswordHasher::default()),
        generator: build_text_generator(config)?,
        clock,
    });
    Ok(web::Data::new(state))
}
