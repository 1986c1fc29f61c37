use serde::Serialize;

use super::period::PeriodKind;

/// Normalized consumption for one period. Both values are always >= 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionPoint {
    pub period_label: String,
    pub period_index: usize,
    pub consumption_with_system: f64,
    pub consumption_without_system: f64,
}

/// With-system vs. without-system comparison inside one period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PeriodComparison {
    pub percent_change: f64,
    pub current_value: f64,
    pub previous_value: f64,
}

/// Everything the dashboard needs to render one device/period view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionSummary {
    pub period_kind: PeriodKind,
    pub period_index: usize,
    pub points: Vec<ConsumptionPoint>,
    pub total_consumption: f64,
    pub total_economy: f64,
    pub economy_rate: f64,
    pub selected_period_consumption: f64,
    pub comparison: PeriodComparison,
    pub activation_hours: f64,
    pub stacked_totals: Vec<f64>,
}
