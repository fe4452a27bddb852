//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: admin login, expert login, logout, and the
//! expert signup flow. Admins and experts authenticate against separate
//! credential tables but share one server-side session store that records
//! which role the token was issued for.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::session_token_from_cookie;
use crate::web::state::AppState;
use axe_visa_core::domain::{Credentials, ExpertProfile, Role};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ExpertSignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: i32,
    pub expertise: String,
    pub countries: String,
    pub company_name: String,
    pub office_address: String,
    pub working_hours: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

//=========================================================================================
// Shared Login Flow
//=========================================================================================

/// Verifies the password, creates a server-side session row, and builds the
/// Set-Cookie response both login handlers return.
async fn complete_login(
    state: &AppState,
    creds: Credentials,
    password: &str,
    role: Role,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<AuthResponse>), (StatusCode, String)>
{
    // 1. Verify password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_string(),
        )
    })?;

    let valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ));
    }

    // 2. Generate session token and expiry
    let token = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    // 3. Create auth session in database
    state
        .db
        .create_auth_session(&token, creds.subject_id, role, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;

    // 4. Create session cookie
    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        ttl.num_seconds()
    );

    let response = AuthResponse {
        id: creds.subject_id,
        email: creds.email,
        role: role.as_str().to_string(),
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/admin/login - Login as an administrator
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn admin_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let creds = state.db.get_admin_by_email(&req.email).await.map_err(|e| {
        error!("Failed to look up admin: {:?}", e);
        (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        )
    })?;

    complete_login(&state, creds, &req.password, Role::Admin).await
}

/// POST /auth/expert/login - Login as an expert
#[utoipa::path(
    post,
    path = "/auth/expert/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn expert_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let creds = state
        .db
        .get_expert_credentials_by_email(&req.email)
        .await
        .map_err(|e| {
            error!("Failed to look up expert: {:?}", e);
            (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            )
        })?;

    complete_login(&state, creds, &req.password, Role::Expert).await
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Extract session cookie
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    let token = session_token_from_cookie(cookie_header)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 2. Delete auth session from database
    state.db.delete_auth_session(token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to logout".to_string(),
        )
    })?;

    // 3. Clear cookie
    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// POST /experts/signup - Register a new expert account
#[utoipa::path(
    post,
    path = "/experts/signup",
    request_body = ExpertSignupRequest,
    responses(
        (status = 201, description = "Expert created successfully", body = AuthResponse),
        (status = 422, description = "Invalid signup data"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn expert_signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExpertSignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the form the same way the dashboard does
    if !req.terms_accepted {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Terms must be accepted".to_string(),
        ));
    }
    if req.password != req.confirm_password {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Passwords do not match".to_string(),
        ));
    }
    if req.email.trim().is_empty() || req.full_name.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Name and email are required".to_string(),
        ));
    }

    // 2. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })?
        .to_string();

    // 3. Create the expert profile
    let profile = ExpertProfile {
        id: Uuid::new_v4(),
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        experience_years: req.experience_years,
        expertise: req.expertise,
        countries: req.countries,
        company_name: req.company_name,
        office_address: req.office_address,
        working_hours: req.working_hours,
        terms_accepted: req.terms_accepted,
        created_at: Utc::now(),
    };

    let created = state
        .db
        .create_expert(profile, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to create expert: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create expert".to_string(),
            )
        })?;

    let response = AuthResponse {
        id: created.id,
        email: created.email,
        role: Role::Expert.as_str().to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
