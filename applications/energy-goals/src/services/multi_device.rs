use std::collections::BTreeMap;

use crate::models::{DeviceData, EntityId, Series, SeriesField};

/// Element-wise sum of every device's measured series into one fixed-length
/// rollup. Missing slots count as zero and values past the fixed length are
/// dropped. Goal default arrays are not combined.
pub fn combine(devices: &BTreeMap<EntityId, DeviceData>) -> DeviceData {
    let mut combined = DeviceData::default();

    for field in SeriesField::ALL {
        let len = field.expected_len();
        let mut totals = vec![0.0_f64; len];

        for data in devices.values() {
            for (slot, value) in totals.iter_mut().zip(data.series(field)) {
                *slot += value.filter(|v| v.is_finite()).unwrap_or(0.0);
            }
        }

        *combined.series_mut(field) = totals.into_iter().map(Some).collect::<Series>();
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn monthly(values: &[f64]) -> DeviceData {
        DeviceData {
            monthly_consumption: values.iter().copied().map(Some).collect(),
            ..DeviceData::default()
        }
    }

    #[test]
    fn test_combine_two_devices() {
        let mut devices = BTreeMap::new();
        devices.insert(EntityId::from(33u32), monthly(&[10.0, 20.0]));
        devices.insert(EntityId::from(36u32), monthly(&[5.0, 0.0]));

        let combined = combine(&devices);

        let mut expected = vec![Some(0.0); 12];
        expected[0] = Some(15.0);
        expected[1] = Some(20.0);
        assert_eq!(combined.monthly_consumption, expected);
    }

    #[test]
    fn test_combine_empty_yields_fixed_length_zeros() {
        let combined = combine(&BTreeMap::new());

        for field in SeriesField::ALL {
            let series = combined.series(field);
            assert_eq!(series.len(), field.expected_len(), "{}", field.api_name());
            assert!(series.iter().all(|v| *v == Some(0.0)));
        }
        assert!(combined.monthly_consumption_goals.is_empty());
    }

    #[test]
    fn test_combine_ignores_nulls_and_overflow() {
        let mut long = vec![Some(1.0); 40];
        long[3] = None;
        let mut devices = BTreeMap::new();
        devices.insert(
            EntityId::from(41u32),
            DeviceData {
                daily_downtime_minutes: long,
                ..DeviceData::default()
            },
        );

        let combined = combine(&devices);

        assert_eq!(combined.daily_downtime_minutes.len(), 31);
        assert_eq!(combined.daily_downtime_minutes[3], Some(0.0));
        assert_eq!(
            combined.daily_downtime_minutes.iter().flatten().sum::<f64>(),
            30.0
        );
    }
}
