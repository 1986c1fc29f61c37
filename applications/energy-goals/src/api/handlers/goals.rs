use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_period, AppState};
use crate::{
    api::models::{
        ClearGoalsResponse, GoalListResponse, GoalRecordResponse, ResolvedGoalResponse,
        SaveGoalRequest,
    },
    error::{AppError, Result},
    models::{EntityId, Namespace, PeriodKind},
};

struct GoalPath {
    device_id: EntityId,
    goal: Namespace,
    period_kind: PeriodKind,
    period_index: u32,
}

fn parse_goal(raw: &str) -> Result<Namespace> {
    raw.parse().map_err(AppError::InvalidInput)
}

fn goal_path(state: &AppState, raw: (String, String, String, u32)) -> Result<GoalPath> {
    let (device_id, goal, period, period_index) = raw;
    Ok(GoalPath {
        device_id: state.known_device(&device_id)?,
        goal: parse_goal(&goal)?,
        period_kind: parse_period(&period, period_index)?,
        period_index,
    })
}

/// GET /api/v1/devices/{device_id}/goals/{goal}
/// Stored overrides for one device
pub async fn list_goals(
    State(state): State<AppState>,
    Path((device_id, goal)): Path<(String, String)>,
) -> Result<Json<GoalListResponse>> {
    let device_id = state.known_device(&device_id)?;
    let goal = parse_goal(&goal)?;

    let goals = state
        .resolver
        .list_goals(goal, &device_id)
        .await
        .into_iter()
        .map(GoalRecordResponse::from)
        .collect();

    Ok(Json(GoalListResponse {
        device_id,
        goal,
        goals,
    }))
}

/// GET /api/v1/devices/{device_id}/goals/{goal}/{period}/{index}
/// Effective goal after the override, remote default and fallback cascade
pub async fn resolve_goal(
    State(state): State<AppState>,
    Path(raw): Path<(String, String, String, u32)>,
) -> Result<Json<ResolvedGoalResponse>> {
    let path = goal_path(&state, raw)?;
    let remote = state.remote_defaults(&path.device_id).await;

    let resolved = state
        .resolver
        .resolve(
            path.goal,
            &path.device_id,
            path.period_kind,
            path.period_index,
            &remote,
        )
        .await;

    Ok(Json(ResolvedGoalResponse {
        device_id: path.device_id,
        goal: path.goal,
        period_kind: path.period_kind,
        period_index: path.period_index,
        value: resolved.value,
        source: resolved.source,
    }))
}

/// PUT /api/v1/devices/{device_id}/goals/{goal}/{period}/{index}
pub async fn save_goal(
    State(state): State<AppState>,
    Path(raw): Path<(String, String, String, u32)>,
    Json(request): Json<SaveGoalRequest>,
) -> Result<Json<GoalRecordResponse>> {
    let path = goal_path(&state, raw)?;

    let record = state
        .resolver
        .try_save_goal(
            path.goal,
            &path.device_id,
            path.period_kind,
            path.period_index,
            request.value,
        )
        .await?;

    Ok(Json(record.into()))
}

/// DELETE /api/v1/devices/{device_id}/goals/{goal}/{period}/{index}
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(raw): Path<(String, String, String, u32)>,
) -> Result<StatusCode> {
    let path = goal_path(&state, raw)?;

    state
        .resolver
        .delete_goal(
            path.goal,
            &path.device_id,
            path.period_kind,
            path.period_index,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/goals
/// Remove every stored goal of every device
pub async fn clear_goals(State(state): State<AppState>) -> (StatusCode, Json<ClearGoalsResponse>) {
    let cleared = state.resolver.clear_goals().await;
    let status = if cleared {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ClearGoalsResponse { cleared }))
}
