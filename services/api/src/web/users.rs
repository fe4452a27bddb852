//! services/api/src/web/users.rs
//!
//! The applicant account listing ("All Users"). Admin-only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::{port_error_response, require_admin};
use axe_visa_core::domain::{Applicant, Session};

#[derive(Serialize, ToSchema)]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Applicant> for ApplicantResponse {
    fn from(a: Applicant) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            created_at: a.created_at,
        }
    }
}

/// GET /users - List all applicant accounts
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Applicants listed", body = [ApplicantResponse]),
        (status = 403, description = "Only admins list applicants")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    let applicants = state
        .db
        .list_applicants()
        .await
        .map_err(port_error_response)?;
    let response: Vec<ApplicantResponse> = applicants.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// DELETE /users/{id} - Remove an applicant account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Applicant id")),
    responses(
        (status = 204, description = "Applicant deleted"),
        (status = 403, description = "Only admins delete applicants"),
        (status = 404, description = "Applicant not found")
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    state
        .db
        .delete_applicant(id)
        .await
        .map_err(port_error_response)?;
    info!(applicant = %id, "applicant deleted");
    Ok(StatusCode::NO_CONTENT)
}
