//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.com","password":"secret1"}
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"secret1"}
//! POST /api/v1/auth/logout
//! GET /api/v1/auth/profile
//! PUT /api/v1/auth/profile {"bio":"Mathematician"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CredentialValidationError, DisplayName, Error, LoginCredentials, ProfilePatch, Registration,
    Role, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, credential_error, require, user_error,
};

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `student` (default) or `instructor`.
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: String,
    pub bio: String,
    pub created_at: String,
    /// Ids of the courses the user is enrolled in, oldest enrollment first.
    pub enrolled_courses: Vec<String>,
}

impl UserResponse {
    fn new(user: &User, enrolled_courses: Vec<String>) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role().as_str().to_owned(),
            avatar: user.avatar().to_owned(),
            bio: user.bio().to_owned(),
            created_at: user.created_at().to_rfc3339(),
            enrolled_courses,
        }
    }

    async fn with_enrollments(state: &HttpState, user: &User) -> Result<Self, Error> {
        let enrolled = state.enrolled.enrolled_courses(user.id()).await?;
        let ids = enrolled
            .iter()
            .map(|entry| entry.course.id().to_string())
            .collect();
        Ok(Self::new(user, ids))
    }
}

fn parse_registration(payload: RegisterRequest) -> Result<Registration, Error> {
    let name = require(payload.name, FieldName::new("name"))?;
    let email = require(payload.email, FieldName::new("email"))?;
    let password = require(payload.password, FieldName::new("password"))?;
    let role = payload
        .role
        .map(|raw| raw.parse::<Role>())
        .transpose()
        .map_err(|err| credential_error(CredentialValidationError::User(err)))?;
    Registration::try_from_parts(&name, &email, &password, role).map_err(credential_error)
}

fn parse_login(payload: LoginRequest) -> Result<LoginCredentials, Error> {
    let email = require(payload.email, FieldName::new("email"))?;
    let password = require(payload.password, FieldName::new("password"))?;
    LoginCredentials::try_from_parts(&email, &password).map_err(credential_error)
}

fn parse_profile(payload: ProfileRequest) -> Result<ProfilePatch, Error> {
    let name = payload
        .name
        .map(DisplayName::new)
        .transpose()
        .map_err(user_error)?;
    Ok(ProfilePatch {
        name,
        bio: payload.bio,
        avatar: payload.avatar,
    })
}

/// Create an account and start a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 422, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    session.persist_actor(&user.actor())?;
    Ok(HttpResponse::Created().json(UserResponse::new(&user, Vec::new())))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = parse_login(payload.into_inner())?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_actor(&user.actor())?;
    Ok(web::Json(UserResponse::with_enrollments(&state, &user).await?))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getProfile"
)]
#[get("/auth/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = session.require_actor()?;
    let user = state.profiles.profile(actor.id()).await?;
    Ok(web::Json(UserResponse::with_enrollments(&state, &user).await?))
}

/// Update the caller's name, bio, or avatar.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let actor = session.require_actor()?;
    let patch = parse_profile(payload.into_inner())?;
    let user = state.accounts.update_profile(actor.id(), patch).await?;
    Ok(web::Json(UserResponse::with_enrollments(&state, &user).await?))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
