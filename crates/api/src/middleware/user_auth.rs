//! Session JWT authentication middleware.
//!
//! Protects administrative locker routes with the bearer token issued by
//! `POST /auth/myToken/line`.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;

/// Authenticated user information extracted from the session token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// LINE user ID from the JWT subject claim.
    pub line_user_id: String,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

/// Extracts the token of a `Bearer` authorization header.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that requires a valid session token.
///
/// Authenticated user information is stored in request extensions for use by
/// downstream handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    match state.auth_service.validate_session_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(UserAuth {
                line_user_id: claims.sub,
                jti: claims.jti,
            });
            next.run(req).await
        }
        Err(_) => unauthorized_response("Invalid or expired token"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
