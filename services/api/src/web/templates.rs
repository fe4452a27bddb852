//! services/api/src/web/templates.rs
//!
//! Letter template submissions: cover letters, no-objection certificates,
//! and sponsorship letters. Available to any authenticated session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::port_error_response;
use crate::web::state::AppState;
use axe_visa_core::domain::{LetterKind, LetterTemplate};

#[derive(Serialize, ToSchema)]
pub struct LetterResponse {
    pub id: Uuid,
    pub kind: String,
    pub fields: BTreeMap<String, String>,
    pub letter_body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LetterTemplate> for LetterResponse {
    fn from(t: LetterTemplate) -> Self {
        Self {
            id: t.id,
            kind: t.kind.as_str().to_string(),
            fields: t.fields,
            letter_body: t.letter_body,
            created_at: t.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLetterRequest {
    /// Form fields of the letter (name, email, job title, company, ...).
    pub fields: BTreeMap<String, String>,
    pub letter_body: String,
}

fn parse_letter_kind(kind: &str) -> Result<LetterKind, (StatusCode, String)> {
    LetterKind::parse(kind).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown letter kind '{}'", kind),
        )
    })
}

/// GET /templates/{kind} - List submitted letters of one kind
#[utoipa::path(
    get,
    path = "/templates/{kind}",
    params(("kind" = String, Path, description = "cover-letter, noc, or sponsorship")),
    responses(
        (status = 200, description = "Letters listed", body = [LetterResponse]),
        (status = 400, description = "Unknown letter kind")
    )
)]
pub async fn list_letters_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_letter_kind(&kind)?;
    let letters = state
        .db
        .list_letters(kind)
        .await
        .map_err(port_error_response)?;
    let response: Vec<LetterResponse> = letters.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST /templates/{kind} - Submit a letter
#[utoipa::path(
    post,
    path = "/templates/{kind}",
    request_body = CreateLetterRequest,
    params(("kind" = String, Path, description = "cover-letter, noc, or sponsorship")),
    responses(
        (status = 201, description = "Letter created", body = LetterResponse),
        (status = 400, description = "Unknown letter kind"),
        (status = 422, description = "Empty letter body")
    )
)]
pub async fn create_letter_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(req): Json<CreateLetterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = parse_letter_kind(&kind)?;
    if req.letter_body.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Letter body is required".to_string(),
        ));
    }

    let template = LetterTemplate {
        id: Uuid::new_v4(),
        kind,
        fields: req.fields,
        letter_body: req.letter_body,
        created_at: Utc::now(),
    };
    let created = state
        .db
        .create_letter(template)
        .await
        .map_err(port_error_response)?;
    Ok((StatusCode::CREATED, Json(LetterResponse::from(created))))
}
