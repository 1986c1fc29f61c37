use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EntityId, MetaRecord, Namespace, PeriodKind};
use crate::services::GoalSource;

#[derive(Debug, Deserialize)]
pub struct SaveGoalRequest {
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoalRecordResponse {
    pub period_kind: PeriodKind,
    pub period_index: u32,
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<MetaRecord> for GoalRecordResponse {
    fn from(record: MetaRecord) -> Self {
        Self {
            period_kind: record.key.period_kind,
            period_index: record.key.period_index,
            value: record.value,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoalListResponse {
    pub device_id: EntityId,
    pub goal: Namespace,
    pub goals: Vec<GoalRecordResponse>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedGoalResponse {
    pub device_id: EntityId,
    pub goal: Namespace,
    pub period_kind: PeriodKind,
    pub period_index: u32,
    pub value: f64,
    pub source: GoalSource,
}

#[derive(Debug, Serialize)]
pub struct ClearGoalsResponse {
    pub cleared: bool,
}
