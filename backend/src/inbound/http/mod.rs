//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod content;
pub mod courses;
pub mod error;
pub mod health;
pub mod progress;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
