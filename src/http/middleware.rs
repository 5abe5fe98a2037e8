//! Session-token middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::Session;
use crate::http::routes::AppError;

/// Header carrying the token issued at match creation
pub const SESSION_HEADER: &str = "x-session-token";

/// Session resolved for the current request
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession {
    pub token: Uuid,
    pub session: Session,
}

/// Extract the session token from its header
pub fn extract_session_token(request: &Request) -> Option<Uuid> {
    request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// Middleware to require a valid session token
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_session_token(&request).ok_or(AppError::Unauthorized)?;
    let session = state.registry.session(&token).ok_or(AppError::Unauthorized)?;

    // Insert into request extensions for handlers to access
    request
        .extensions_mut()
        .insert(CurrentSession { token, session });

    Ok(next.run(request).await)
}
