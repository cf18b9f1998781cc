//! LINE login endpoint handlers.
//!
//! Browser-facing endpoints answer with `302 Found` redirects; token
//! endpoints answer with JSON.

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::models::auth::{
    LineCallbackQuery, LineTokenRequest, LoginPageQuery, SessionTokenRequest,
};
use domain::models::{JwtTokenInfo, LineAccessToken};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_session_issued;
use crate::services::LoginKind;

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Redirect to LINE login for the LIFF application.
///
/// GET /auth/lineLoginPage?redirect=<path>
pub async fn line_login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginPageQuery>,
) -> Result<Response, ApiError> {
    let url = state
        .auth_service
        .build_login_url(LoginKind::User, query.redirect.as_deref())?;
    Ok(found(url))
}

/// Redirect to LINE login for the admin console.
///
/// GET /auth/admin/lineLoginPage
pub async fn admin_line_login_page(State(state): State<AppState>) -> Result<Response, ApiError> {
    let url = state.auth_service.build_login_url(LoginKind::Admin, None)?;
    Ok(found(url))
}

/// LINE callback for the LIFF application.
///
/// GET /auth/line/callback?code=<code>&state=<state>
pub async fn line_callback(
    State(state): State<AppState>,
    Query(query): Query<LineCallbackQuery>,
) -> Result<Response, ApiError> {
    let url = state
        .auth_service
        .resolve_callback(&query.code, &query.state)?;
    Ok(found(url))
}

/// LINE callback for the admin console.
///
/// GET /auth/line/admin/callback?code=<code>&state=<state>
pub async fn admin_line_callback(
    State(state): State<AppState>,
    Query(query): Query<LineCallbackQuery>,
) -> Result<Response, ApiError> {
    let url = state
        .auth_service
        .resolve_admin_callback(&query.code, &query.state)?;
    Ok(found(url))
}

/// Exchange a LIFF authorization code for a LINE ID token.
///
/// POST /auth/token/line
pub async fn line_token(
    State(state): State<AppState>,
    Json(request): Json<LineTokenRequest>,
) -> Result<Json<LineAccessToken>, ApiError> {
    exchange(&state, LoginKind::User, request).await
}

/// Exchange an admin authorization code for a LINE ID token.
///
/// POST /auth/admin/token/line
pub async fn admin_line_token(
    State(state): State<AppState>,
    Json(request): Json<LineTokenRequest>,
) -> Result<Json<LineAccessToken>, ApiError> {
    exchange(&state, LoginKind::Admin, request).await
}

async fn exchange(
    state: &AppState,
    kind: LoginKind,
    request: LineTokenRequest,
) -> Result<Json<LineAccessToken>, ApiError> {
    request.validate()?;
    let token = state
        .auth_service
        .exchange_code_for_token(kind, &request.code)
        .await?;
    Ok(Json(token))
}

/// Exchange a LINE ID token for a session token.
///
/// POST /auth/myToken/line
pub async fn my_token(
    State(state): State<AppState>,
    Json(request): Json<SessionTokenRequest>,
) -> Result<Json<JwtTokenInfo>, ApiError> {
    request.validate()?;
    let info = state.auth_service.issue_session_token(&request.line_token)?;
    record_session_issued();
    Ok(Json(info))
}
