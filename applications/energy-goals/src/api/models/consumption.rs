use serde::{Deserialize, Serialize};

use crate::config::DeviceInfo;
use crate::models::{ConsumptionPoint, ConsumptionSummary, EntityId, PeriodKind};
use crate::services::{ResolvedGoal, ValidationReport};

#[derive(Debug, Deserialize)]
pub struct ConsumptionQuery {
    #[serde(default = "default_period")]
    pub period: PeriodKind,
    #[serde(default)]
    pub index: u32,
}

fn default_period() -> PeriodKind {
    PeriodKind::Monthly
}

#[derive(Debug, Serialize)]
pub struct FailedDevice {
    pub device_id: EntityId,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ConsumptionResponse {
    pub device_id: EntityId,
    #[serde(flatten)]
    pub summary: ConsumptionSummary,
    pub consumption_goal: ResolvedGoal,
    pub activation_goal: ResolvedGoal,
    /// Recent periods for the trend chart.
    pub recent: Vec<ConsumptionPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_devices: Vec<FailedDevice>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub total_devices: usize,
    pub reports: Vec<ValidationReport>,
    pub failed_devices: Vec<FailedDevice>,
}
