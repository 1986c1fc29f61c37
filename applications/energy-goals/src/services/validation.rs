use serde::Serialize;

use crate::models::{DeviceData, EntityId, PeriodKind, SeriesField};

/// A single data quality finding for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    EmptySeries { field: String },
    NullValues { field: String, count: usize },
    NegativeValues { field: String, count: usize },
    OccupancyOutOfRange { field: String, count: usize },
    LengthMismatch {
        with_system: usize,
        without_system: usize,
        period_kind: PeriodKind,
    },
    AllZero { field: String },
}

/// Per-device outcome of [`validate_device_data`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub device_id: EntityId,
    pub data_points: Vec<(String, usize)>,
    pub issues: Vec<DataIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn validate_device_data(device_id: &EntityId, data: &DeviceData) -> ValidationReport {
    let mut issues = Vec::new();
    let mut data_points = Vec::with_capacity(SeriesField::ALL.len());

    for field in SeriesField::ALL {
        let series = data.series(field);
        let name = field.api_name().to_string();
        data_points.push((name.clone(), series.len()));

        if series.is_empty() {
            issues.push(DataIssue::EmptySeries { field: name });
            continue;
        }

        let nulls = series.iter().filter(|v| v.is_none()).count();
        if nulls > 0 {
            issues.push(DataIssue::NullValues {
                field: name.clone(),
                count: nulls,
            });
        }

        let negatives = series.iter().flatten().filter(|v| **v < 0.0).count();
        if negatives > 0 {
            issues.push(DataIssue::NegativeValues {
                field: name.clone(),
                count: negatives,
            });
        }

        if field.is_occupancy() {
            let out_of_range = series
                .iter()
                .flatten()
                .filter(|v| !(0.0..=100.0).contains(*v))
                .count();
            if out_of_range > 0 {
                issues.push(DataIssue::OccupancyOutOfRange {
                    field: name.clone(),
                    count: out_of_range,
                });
            }
        } else if series.iter().all(|v| v.unwrap_or(0.0) == 0.0) {
            issues.push(DataIssue::AllZero { field: name });
        }
    }

    for kind in [PeriodKind::Monthly, PeriodKind::Daily] {
        let with_system = data.consumption(kind).len();
        let without_system = data.without_system(kind).len();
        if with_system > 0 && without_system > 0 && with_system != without_system {
            issues.push(DataIssue::LengthMismatch {
                with_system,
                without_system,
                period_kind: kind,
            });
        }
    }

    ValidationReport {
        device_id: device_id.clone(),
        data_points,
        issues,
    }
}
