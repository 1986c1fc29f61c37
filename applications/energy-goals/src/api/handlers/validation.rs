use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::{
    api::models::{FailedDevice, ValidationResponse},
    client::fetch_fleet,
    error::Result,
    services::validate_device_data,
};

/// GET /api/v1/devices/{device_id}/validation
/// Data quality report; `all` checks every configured device
pub async fn validate_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<ValidationResponse>> {
    let device_id = state.known_device(&device_id)?;
    let ids = if device_id.is_all() {
        state.device_ids()
    } else {
        vec![device_id]
    };

    let snapshot = fetch_fleet(state.source.as_ref(), &ids).await;
    let reports = snapshot
        .data
        .iter()
        .map(|(id, data)| validate_device_data(id, data))
        .collect();
    let failed_devices = snapshot
        .failed
        .into_iter()
        .map(|(device_id, error)| FailedDevice { device_id, error })
        .collect();

    Ok(Json(ValidationResponse {
        total_devices: ids.len(),
        reports,
        failed_devices,
    }))
}
