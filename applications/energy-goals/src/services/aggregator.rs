//! Consumption series normalization and summary statistics.

use crate::models::{
    ConsumptionPoint, ConsumptionSummary, DeviceData, PeriodComparison, PeriodKind,
};

/// Assumed share of baseline consumption left once the system is running.
pub const BASELINE_EFFICIENCY: f64 = 0.8;

/// Hours a device can be active in one period.
pub fn period_hours(kind: PeriodKind) -> f64 {
    match kind {
        PeriodKind::Daily => 24.0,
        PeriodKind::Monthly => 720.0,
    }
}

pub fn ensure_non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Without-system value for one period given its (already clamped)
/// with-system value and the raw slot from the API.
pub fn derive_without_system(with_system: f64, raw_without: Option<f64>) -> f64 {
    if with_system == 0.0 {
        return 0.0;
    }
    match raw_without {
        Some(v) if v != 0.0 => ensure_non_negative(v),
        Some(_) => 0.0,
        None => ensure_non_negative(with_system / BASELINE_EFFICIENCY),
    }
}

/// Pair raw with-system and without-system series into points. The output
/// has one point per with-system slot.
pub fn normalize(
    with_system: &[Option<f64>],
    without_system: &[Option<f64>],
    kind: PeriodKind,
) -> Vec<ConsumptionPoint> {
    with_system
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let with = ensure_non_negative(raw.unwrap_or(0.0));
            let without = derive_without_system(with, without_system.get(index).copied().flatten());
            ConsumptionPoint {
                period_label: kind.label(index),
                period_index: index,
                consumption_with_system: with,
                consumption_without_system: without,
            }
        })
        .collect()
}

/// Sum of with-system consumption over the whole series.
pub fn total_consumption(points: &[ConsumptionPoint]) -> f64 {
    points.iter().map(|p| p.consumption_with_system).sum()
}

pub fn total_economy(points: &[ConsumptionPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.consumption_without_system)
        .filter(|v| *v > 0.0)
        .sum()
}

/// Economy as a percentage of consumption, capped at 100.
pub fn economy_rate(total_economy: f64, total_consumption: f64) -> f64 {
    if total_consumption <= 0.0 {
        return 0.0;
    }
    (total_economy / total_consumption * 100.0).min(100.0)
}

fn clamp_index(len: usize, index: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Compares with-system against without-system inside the selected period.
/// `current_value` is the with-system value, `previous_value` the
/// without-system one.
pub fn period_over_period_change(points: &[ConsumptionPoint], index: usize) -> PeriodComparison {
    if points.is_empty() {
        return PeriodComparison::default();
    }

    let point = &points[clamp_index(points.len(), index)];
    let with = point.consumption_with_system;
    let without = point.consumption_without_system;
    let economy = (without - with).max(0.0);
    let percent_change = if without == 0.0 {
        0.0
    } else {
        economy / without * 100.0
    };

    PeriodComparison {
        percent_change,
        current_value: with,
        previous_value: without,
    }
}

/// With-system consumption of the selected period; 0 when out of range.
pub fn selected_period_consumption(points: &[ConsumptionPoint], index: usize) -> f64 {
    points
        .get(index)
        .map(|p| p.consumption_with_system)
        .unwrap_or(0.0)
}

/// Per-period height of the stacked bar (with + without system).
pub fn stacked_totals(points: &[ConsumptionPoint]) -> Vec<f64> {
    points
        .iter()
        .map(|p| ensure_non_negative(p.consumption_with_system + p.consumption_without_system))
        .collect()
}

/// The last `count` points of the series.
pub fn trailing_periods(points: &[ConsumptionPoint], count: usize) -> &[ConsumptionPoint] {
    &points[points.len().saturating_sub(count)..]
}

/// Hours the device was active: the period's hours minus downtime.
pub fn activation_hours(downtime_minutes: &[Option<f64>], kind: PeriodKind, index: usize) -> f64 {
    let minutes = downtime_minutes
        .get(index)
        .copied()
        .flatten()
        .filter(|m| m.is_finite())
        .unwrap_or(0.0);
    (period_hours(kind) - minutes / 60.0).max(0.0)
}

pub fn summarize(data: &DeviceData, kind: PeriodKind, index: usize) -> ConsumptionSummary {
    let points = normalize(data.consumption(kind), data.without_system(kind), kind);
    let total_consumption = total_consumption(&points);
    let total_economy = total_economy(&points);

    ConsumptionSummary {
        period_kind: kind,
        period_index: index,
        total_consumption,
        total_economy,
        economy_rate: economy_rate(total_economy, total_consumption),
        selected_period_consumption: selected_period_consumption(&points, index),
        comparison: period_over_period_change(&points, index),
        activation_hours: activation_hours(data.downtime_minutes(kind), kind, index),
        stacked_totals: stacked_totals(&points),
        points,
    }
}
