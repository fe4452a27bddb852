//! services/api/src/web/experts.rs
//!
//! The expert directory: listing, detail, and removal. Listings are visible
//! to any authenticated session (admins use them to populate the assignment
//! dropdown); removal is admin-only.

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
use axe_visa_core::domain::{ExpertProfile, Session};

#[derive(Serialize, ToSchema)]
pub struct ExpertResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: i32,
    pub expertise: String,
    pub countries: String,
    pub company_name: String,
    pub office_address: String,
    pub working_hours: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ExpertProfile> for ExpertResponse {
    fn from(p: ExpertProfile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            email: p.email,
            phone: p.phone,
            experience_years: p.experience_years,
            expertise: p.expertise,
            countries: p.countries,
            company_name: p.company_name,
            office_address: p.office_address,
            working_hours: p.working_hours,
            created_at: p.created_at,
        }
    }
}

/// GET /experts - List all experts
#[utoipa::path(
    get,
    path = "/experts",
    responses(
        (status = 200, description = "Experts listed", body = [ExpertResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_experts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let experts = state.db.list_experts().await.map_err(port_error_response)?;
    let response: Vec<ExpertResponse> = experts.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// GET /experts/{id} - Fetch one expert profile
#[utoipa::path(
    get,
    path = "/experts/{id}",
    params(("id" = Uuid, Path, description = "Expert id")),
    responses(
        (status = 200, description = "Expert found", body = ExpertResponse),
        (status = 404, description = "Expert not found")
    )
)]
pub async fn get_expert_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let expert = state.db.get_expert(id).await.map_err(port_error_response)?;
    Ok(Json(ExpertResponse::from(expert)))
}

/// DELETE /experts/{id} - Remove an expert account
#[utoipa::path(
    delete,
    path = "/experts/{id}",
    params(("id" = Uuid, Path, description = "Expert id")),
    responses(
        (status = 204, description = "Expert deleted"),
        (status = 403, description = "Only admins delete experts"),
        (status = 404, description = "Expert not found")
    )
)]
pub async fn delete_expert_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    state
        .db
        .delete_expert(id)
        .await
        .map_err(port_error_response)?;
    info!(expert = %id, "expert deleted");
    Ok(StatusCode::NO_CONTENT)
}
