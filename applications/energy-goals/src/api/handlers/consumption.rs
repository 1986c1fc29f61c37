use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::AppState;
use crate::{
    api::models::{ConsumptionQuery, ConsumptionResponse},
    error::{AppError, Result},
    models::{Namespace, PeriodKind},
    services::{aggregator, RemoteDefaults},
};

/// Months shown in the monthly trend chart.
const RECENT_MONTHS: usize = 3;

/// GET /api/v1/devices/{device_id}/consumption?period=&index=
/// Normalized series, totals and resolved goals for one period
pub async fn get_consumption(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ConsumptionQuery>,
) -> Result<Json<ConsumptionResponse>> {
    let device_id = state.known_device(&device_id)?;
    let kind = query.period;
    if !kind.contains_index(query.index) {
        return Err(AppError::InvalidInput(format!(
            "period index {} is out of range for {} data",
            query.index, kind
        )));
    }

    let (data, failed_devices) = state.load_device_data(&device_id).await?;
    let remote = if device_id.is_all() {
        RemoteDefaults::none()
    } else {
        RemoteDefaults::from(&data)
    };

    let summary = aggregator::summarize(&data, kind, query.index as usize);
    let recent = match kind {
        PeriodKind::Monthly => aggregator::trailing_periods(&summary.points, RECENT_MONTHS).to_vec(),
        PeriodKind::Daily => summary.points.clone(),
    };

    let consumption_goal = state
        .resolver
        .resolve(Namespace::ConsumptionGoal, &device_id, kind, query.index, &remote)
        .await;
    let activation_goal = state
        .resolver
        .resolve(Namespace::ActivationGoal, &device_id, kind, query.index, &remote)
        .await;

    Ok(Json(ConsumptionResponse {
        device_id,
        summary,
        consumption_goal,
        activation_goal,
        recent,
        failed_devices,
    }))
}
