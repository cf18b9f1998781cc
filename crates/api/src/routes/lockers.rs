//! Locker endpoint handlers.
//!
//! Device endpoints are addressed by serial number and authenticate with the
//! device secret or not at all; administrative endpoints are addressed by id
//! and sit behind the session token middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use domain::models::locker::{
    CreateLockerRequest, EditLockerRequest, LockerActiveResponse, RegisterLockerRequest,
};
use domain::models::{Locker, LockerCurrentStatus, LockerDetails};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_locker_action, record_locker_created};
use crate::middleware::UserAuth;

/// Create the record of a new locker device.
///
/// POST /locker
pub async fn create_locker(
    State(state): State<AppState>,
    Json(request): Json<CreateLockerRequest>,
) -> Result<(StatusCode, Json<Locker>), ApiError> {
    request.validate()?;
    let locker = state.locker_service.create_locker(&request.secret).await?;
    record_locker_created();
    Ok((StatusCode::CREATED, Json(locker)))
}

/// Current open/closed status of a locker.
///
/// GET /locker/serial/:serial/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> Result<Json<LockerCurrentStatus>, ApiError> {
    let status = state
        .locker_service
        .get_current_status(&serial_number)
        .await?;
    Ok(Json(status))
}

/// Record that a locker was closed.
///
/// POST /locker/serial/:serial/lock
pub async fn lock(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> Result<Json<LockerCurrentStatus>, ApiError> {
    let status = state.locker_service.lock(&serial_number).await?;
    record_locker_action("close");
    Ok(Json(status))
}

/// Record that a locker was opened.
///
/// POST /locker/serial/:serial/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> Result<Json<LockerCurrentStatus>, ApiError> {
    let status = state.locker_service.unlock(&serial_number).await?;
    record_locker_action("open");
    Ok(Json(status))
}

/// List every locker with its location.
///
/// GET /locker
pub async fn list_lockers(
    State(state): State<AppState>,
) -> Result<Json<Vec<LockerDetails>>, ApiError> {
    let lockers = state.locker_service.list_lockers_with_location().await?;
    Ok(Json(lockers))
}

/// Whether a locker is registered and available.
///
/// GET /locker/:id/active
pub async fn is_active(
    State(state): State<AppState>,
    Path(locker_id): Path<i64>,
) -> Result<Json<LockerActiveResponse>, ApiError> {
    let is_active = state.locker_service.is_locker_active(locker_id).await?;
    Ok(Json(LockerActiveResponse { is_active }))
}

/// A locker with all of its rental sessions.
///
/// GET /locker/:id/history
pub async fn history(
    State(state): State<AppState>,
    Path(locker_id): Path<i64>,
) -> Result<Json<LockerDetails>, ApiError> {
    let details = state
        .locker_service
        .find_locker_instance_history(locker_id)
        .await?;
    Ok(Json(details))
}

/// Register an unregistered locker at a location.
///
/// PUT /locker/:id/register
pub async fn register_locker(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuth>,
    Path(locker_id): Path<i64>,
    Json(request): Json<RegisterLockerRequest>,
) -> Result<Json<Locker>, ApiError> {
    request.validate()?;
    tracing::debug!(locker_id, user = %user.line_user_id, "Registering locker");
    let locker = state
        .locker_service
        .register_locker(locker_id, &request)
        .await?;
    Ok(Json(locker))
}

/// Update a locker's descriptive fields.
///
/// PATCH /locker/:id
pub async fn edit_locker(
    State(state): State<AppState>,
    Path(locker_id): Path<i64>,
    Json(request): Json<EditLockerRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation(
            "At least one field must be provided".into(),
            Vec::new(),
        ));
    }
    state.locker_service.edit_locker(locker_id, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a locker with its rental history.
///
/// DELETE /locker/:id
pub async fn delete_locker(
    State(state): State<AppState>,
    Extension(user): Extension<UserAuth>,
    Path(locker_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    tracing::info!(locker_id, user = %user.line_user_id, jti = %user.jti, "Deleting locker");
    state.locker_service.delete_locker(locker_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
