//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;
use axe_visa_core::domain::Session;

/// Pulls the session token out of a `Cookie` header value.
pub(crate) fn session_token_from_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=")
    })
}

/// Middleware that validates the auth session cookie and resolves the acting
/// `Session` (role + subject id).
///
/// If valid, inserts the session into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized. Handlers never read the
/// cookie themselves; they only ever see the explicit `Session` value.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract cookie header
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Parse session token from cookie
    let token = session_token_from_cookie(cookie_header)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 3. Validate auth session in database, get subject and role
    let (subject_id, role) = state.db.validate_auth_session(&token).await.map_err(|e| {
        error!("Failed to validate auth session: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    // 4. Insert the resolved session into request extensions
    req.extensions_mut().insert(Session {
        role,
        subject_id,
        token,
    });

    // 5. Continue to the handler
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::session_token_from_cookie;

    #[test]
    fn finds_session_among_other_cookies() {
        let header = "theme=dark; session=abc-123; lang=en";
        assert_eq!(session_token_from_cookie(header), Some("abc-123"));
    }

    #[test]
    fn missing_session_cookie_yields_none() {
        assert_eq!(session_token_from_cookie("theme=dark; lang=en"), None);
        assert_eq!(session_token_from_cookie(""), None);
    }
}
