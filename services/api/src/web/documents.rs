//! services/api/src/web/documents.rs
//!
//! Platform-level supporting documents managed from the settings screens.
//! Admin-only. File contents live in external storage; only opaque
//! references are stored here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::{port_error_response, require_admin};
use axe_visa_core::domain::{PlatformDocument, Session};

#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub file_ref: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PlatformDocument> for DocumentResponse {
    fn from(d: PlatformDocument) -> Self {
        Self {
            id: d.id,
            title: d.title,
            file_ref: d.file_ref,
            created_at: d.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub file_ref: String,
}

/// GET /documents - List all platform documents
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents listed", body = [DocumentResponse]),
        (status = 403, description = "Only admins manage documents")
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    let docs = state
        .db
        .list_documents()
        .await
        .map_err(port_error_response)?;
    let response: Vec<DocumentResponse> = docs.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST /documents - Register a new platform document
#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 403, description = "Only admins manage documents"),
        (status = 422, description = "Missing title or file reference")
    )
)]
pub async fn create_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    if req.title.trim().is_empty() || req.file_ref.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title and file reference are required".to_string(),
        ));
    }
    let doc = state
        .db
        .create_document(req.title.trim(), req.file_ref.trim())
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(doc))))
}

/// DELETE /documents/{id} - Remove a platform document
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 403, description = "Only admins manage documents"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    require_admin(&session)?;
    state
        .db
        .delete_document(id)
        .await
        .map_err(port_error_response)?;
    info!(document = %id, "platform document deleted");
    Ok(StatusCode::NO_CONTENT)
}
