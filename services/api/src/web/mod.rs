pub mod applications;
pub mod auth;
pub mod documents;
pub mod experts;
pub mod middleware;
pub mod state;
pub mod templates;
pub mod users;

use axum::http::StatusCode;
use axe_visa_core::policy::PolicyError;
use axe_visa_core::ports::PortError;
use utoipa::OpenApi;

pub use middleware::require_auth;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::admin_login_handler,
        auth::expert_login_handler,
        auth::logout_handler,
        auth::expert_signup_handler,
        applications::list_applications_handler,
        applications::get_application_handler,
        applications::update_status_handler,
        applications::assign_expert_handler,
        applications::admin_note_handler,
        applications::delete_application_handler,
        experts::list_experts_handler,
        experts::get_expert_handler,
        experts::delete_expert_handler,
        users::list_users_handler,
        users::delete_user_handler,
        documents::list_documents_handler,
        documents::create_document_handler,
        documents::delete_document_handler,
        templates::list_letters_handler,
        templates::create_letter_handler,
    ),
    components(schemas(
        auth::LoginRequest,
        auth::AuthResponse,
        auth::ExpertSignupRequest,
        applications::ApplicationResponse,
        applications::UpdateStatusRequest,
        applications::AssignExpertRequest,
        applications::AdminNoteRequest,
        experts::ExpertResponse,
        users::ApplicantResponse,
        documents::DocumentResponse,
        documents::CreateDocumentRequest,
        templates::LetterResponse,
        templates::CreateLetterRequest,
    )),
    tags(
        (name = "Axe Visa Admin API", description = "REST backend for the visa/passport admin dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Error Mapping
//=========================================================================================

/// Admin-only guard for the directory surfaces (experts, users, documents)
/// that have no per-record policy.
pub(crate) fn require_admin(
    session: &axe_visa_core::domain::Session,
) -> Result<(), (StatusCode, String)> {
    if session.role == axe_visa_core::domain::Role::Admin {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            "Operation not permitted for this session".to_string(),
        ))
    }
}

/// Maps a port failure to the response the dashboard surfaces inline.
pub(crate) fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            tracing::error!("port failure: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            )
        }
    }
}

/// Maps a policy refusal to the response the dashboard surfaces inline.
/// The record state is always left unchanged on these paths.
pub(crate) fn policy_error_response(err: PolicyError) -> (StatusCode, String) {
    match err {
        PolicyError::Forbidden => (
            StatusCode::FORBIDDEN,
            "Operation not permitted for this session".to_string(),
        ),
        PolicyError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        PolicyError::NotFound => (StatusCode::NOT_FOUND, "Record not found".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_map_to_expected_statuses() {
        assert_eq!(
            policy_error_response(PolicyError::Forbidden).0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            policy_error_response(PolicyError::InvalidInput("reason".into())).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            policy_error_response(PolicyError::NotFound).0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn port_errors_map_to_expected_statuses() {
        assert_eq!(
            port_error_response(PortError::NotFound("x".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            port_error_response(PortError::Unauthorized).0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            port_error_response(PortError::Unexpected("boom".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
