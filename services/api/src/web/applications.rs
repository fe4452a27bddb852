//! services/api/src/web/applications.rs
//!
//! Handlers for the application records (KYC submissions, passport
//! applications, visa applications). All three families share one set of
//! routes keyed by kind, and every decision about what a session may do is
//! delegated to `axe_visa_core::policy` - the handlers themselves contain
//! no role branching.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::{policy_error_response, port_error_response};
use axe_visa_core::domain::{ApplicationKind, ApplicationRecord, ApplicationStatus, Session};
use axe_visa_core::policy;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// An application record as returned to the dashboard, together with the
/// policy decisions the UI needs to render its controls.
#[derive(Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub kind: String,
    pub applicant_fields: BTreeMap<String, String>,
    pub status: String,
    pub assigned_expert_id: Option<Uuid>,
    pub reason: Option<String>,
    pub admin_reason: Option<String>,
    pub attached_documents: BTreeMap<String, String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Statuses the acting session may move this record to. Empty unless the
    /// session is the assigned expert and the record is still pending.
    pub available_transitions: Vec<String>,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_assign_expert: bool,
}

impl ApplicationResponse {
    fn from_record(record: ApplicationRecord, session: &Session) -> Self {
        let available_transitions = policy::available_transitions(session, &record)
            .into_iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let can_edit = policy::can_edit(session, &record);
        let can_delete = policy::can_delete(session, &record);
        let can_assign_expert = policy::can_assign_expert(session);
        // Admin annotations are not shown to experts.
        let admin_reason = match session.role {
            axe_visa_core::domain::Role::Admin => record.admin_reason,
            axe_visa_core::domain::Role::Expert => None,
        };
        Self {
            id: record.id,
            kind: record.kind.as_str().to_string(),
            applicant_fields: record.applicant_fields,
            status: record.status.as_str().to_string(),
            assigned_expert_id: record.assigned_expert_id,
            reason: record.reason,
            admin_reason,
            attached_documents: record.attached_documents,
            created_at: record.created_at,
            available_transitions,
            can_edit,
            can_delete,
            can_assign_expert,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignExpertRequest {
    pub expert_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminNoteRequest {
    pub admin_reason: String,
}

fn parse_kind(kind: &str) -> Result<ApplicationKind, (StatusCode, String)> {
    ApplicationKind::parse(kind).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown application kind '{}'", kind),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// GET /applications/{kind} - List application records.
///
/// Admins see every record; experts get the server-side listing scoped to
/// records assigned to them, so nothing here needs a per-record view check.
#[utoipa::path(
    get,
    path = "/applications/{kind}",
    params(("kind" = String, Path, description = "kyc, passport, or visa")),
    responses(
        (status = 200, description = "Records listed", body = [ApplicationResponse]),
        (status = 400, description = "Unknown application kind"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_applications_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;

    let records = match session.role {
        axe_visa_core::domain::Role::Admin => state.db.list_applications(kind).await,
        axe_visa_core::domain::Role::Expert => {
            state
                .db
                .list_applications_for_expert(kind, session.subject_id)
                .await
        }
    }
    .map_err(port_error_response)?;

    let response: Vec<ApplicationResponse> = records
        .into_iter()
        .map(|r| ApplicationResponse::from_record(r, &session))
        .collect();
    Ok(Json(response))
}

/// GET /applications/{kind}/{id} - Fetch a single record's detail view.
#[utoipa::path(
    get,
    path = "/applications/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "kyc, passport, or visa"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record found", body = ApplicationResponse),
        (status = 403, description = "Not permitted to view this record"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    let record = state
        .db
        .get_application(kind, id)
        .await
        .map_err(port_error_response)?;

    if !policy::can_view(&session, &record) {
        return Err((
            StatusCode::FORBIDDEN,
            "Not permitted to view this record".to_string(),
        ));
    }

    Ok(Json(ApplicationResponse::from_record(record, &session)))
}

/// PUT /applications/{kind}/{id}/status - Accept or reject a record.
///
/// The policy re-validates everything the dashboard should already have
/// checked: only the assigned expert may transition, only while pending,
/// and only with a non-empty reason.
#[utoipa::path(
    put,
    path = "/applications/{kind}/{id}/status",
    request_body = UpdateStatusRequest,
    params(
        ("kind" = String, Path, description = "kyc, passport, or visa"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Status updated", body = ApplicationResponse),
        (status = 403, description = "Transition not permitted"),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Missing reason or malformed status")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;
    let target = ApplicationStatus::parse(&req.status).ok_or_else(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unknown status '{}'", req.status),
        )
    })?;

    let record = state
        .db
        .get_application(kind, id)
        .await
        .map_err(port_error_response)?;

    let updated = policy::apply_transition(&session, &record, target, &req.reason)
        .map_err(policy_error_response)?;

    state
        .db
        .update_application(&updated)
        .await
        .map_err(port_error_response)?;

    info!(
        record = %updated.id,
        status = updated.status.as_str(),
        "application status updated"
    );
    Ok(Json(ApplicationResponse::from_record(updated, &session)))
}

/// PUT /applications/{kind}/{id}/assign - Assign an expert to a record.
///
/// Assignment is distinct from a status transition; it never changes the
/// status and is allowed in any status.
#[utoipa::path(
    put,
    path = "/applications/{kind}/{id}/assign",
    request_body = AssignExpertRequest,
    params(
        ("kind" = String, Path, description = "kyc, passport, or visa"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Expert assigned", body = ApplicationResponse),
        (status = 403, description = "Only admins assign experts"),
        (status = 404, description = "Record or expert not found")
    )
)]
pub async fn assign_expert_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(req): Json<AssignExpertRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;

    let record = state
        .db
        .get_application(kind, id)
        .await
        .map_err(port_error_response)?;

    let updated = policy::assign_expert(&session, &record, req.expert_id)
        .map_err(policy_error_response)?;

    // The target expert must exist before the assignment is persisted.
    state
        .db
        .get_expert(req.expert_id)
        .await
        .map_err(port_error_response)?;

    state
        .db
        .update_application(&updated)
        .await
        .map_err(port_error_response)?;

    info!(record = %updated.id, expert = %req.expert_id, "expert assigned");
    Ok(Json(ApplicationResponse::from_record(updated, &session)))
}

/// PUT /applications/{kind}/{id}/admin-note - Set the admin-only annotation.
#[utoipa::path(
    put,
    path = "/applications/{kind}/{id}/admin-note",
    request_body = AdminNoteRequest,
    params(
        ("kind" = String, Path, description = "kyc, passport, or visa"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Annotation saved", body = ApplicationResponse),
        (status = 403, description = "Only admins annotate records"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn admin_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(req): Json<AdminNoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;

    let record = state
        .db
        .get_application(kind, id)
        .await
        .map_err(port_error_response)?;

    if !policy::can_edit(&session, &record) {
        return Err((
            StatusCode::FORBIDDEN,
            "Only admins annotate records".to_string(),
        ));
    }

    let mut updated = record;
    updated.admin_reason = Some(req.admin_reason);

    state
        .db
        .update_application(&updated)
        .await
        .map_err(port_error_response)?;

    Ok(Json(ApplicationResponse::from_record(updated, &session)))
}

/// DELETE /applications/{kind}/{id} - Irreversibly delete a record.
#[utoipa::path(
    delete,
    path = "/applications/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "kyc, passport, or visa"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 403, description = "Only admins delete records"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn delete_application_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_kind(&kind)?;

    let record = state
        .db
        .get_application(kind, id)
        .await
        .map_err(port_error_response)?;

    if !policy::can_delete(&session, &record) {
        return Err((
            StatusCode::FORBIDDEN,
            "Only admins delete records".to_string(),
        ));
    }

    state
        .db
        .delete_application(kind, id)
        .await
        .map_err(|e| {
            error!("Failed to delete application {}: {:?}", id, e);
            port_error_response(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}
