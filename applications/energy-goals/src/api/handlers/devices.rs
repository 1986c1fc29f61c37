use axum::{extract::State, Json};

use super::AppState;
use crate::api::models::DevicesResponse;

/// GET /api/v1/devices
pub async fn list_devices(State(state): State<AppState>) -> Json<DevicesResponse> {
    Json(DevicesResponse {
        devices: state.devices.as_ref().clone(),
    })
}
