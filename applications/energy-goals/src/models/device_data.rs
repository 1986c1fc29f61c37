use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{value::RawValue, Value};

use super::period::PeriodKind;

/// One raw value slot as delivered by the metrics API. `None` means the
/// source left the slot null.
pub type Series = Vec<Option<f64>>;

/// Per-device metrics body returned by the remote API.
///
/// Every series is decoded leniently: missing or non-array fields become
/// empty series, numeric strings are parsed, and anything else non-numeric
/// counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceData {
    #[serde(rename = "consumo_mensal", default, deserialize_with = "lenient_series")]
    pub monthly_consumption: Series,
    #[serde(
        rename = "consumo_diario_mes_corrente",
        default,
        deserialize_with = "lenient_series"
    )]
    pub daily_consumption: Series,
    #[serde(
        rename = "consumo_sem_sistema_mensal",
        default,
        deserialize_with = "lenient_series"
    )]
    pub monthly_without_system: Series,
    #[serde(
        rename = "consumo_sem_sistema_diario",
        default,
        deserialize_with = "lenient_series"
    )]
    pub daily_without_system: Series,
    #[serde(
        rename = "minutos_desligado_mensal",
        default,
        deserialize_with = "lenient_series"
    )]
    pub monthly_downtime_minutes: Series,
    #[serde(
        rename = "minutos_desligado_diario",
        default,
        deserialize_with = "lenient_series"
    )]
    pub daily_downtime_minutes: Series,
    #[serde(rename = "ocupacao_mensal", default, deserialize_with = "lenient_series")]
    pub monthly_occupancy: Series,
    #[serde(rename = "ocupacao_diaria", default, deserialize_with = "lenient_series")]
    pub daily_occupancy: Series,
    #[serde(
        rename = "meta_consumo_mensal",
        default,
        deserialize_with = "lenient_series",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub monthly_consumption_goals: Series,
    #[serde(
        rename = "meta_consumo_diaria",
        default,
        deserialize_with = "lenient_series",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub daily_consumption_goals: Series,
    #[serde(
        rename = "meta_tempo_atuacao_mensal",
        default,
        deserialize_with = "lenient_series",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub monthly_activation_goals: Series,
    #[serde(
        rename = "meta_tempo_atuacao_diaria",
        default,
        deserialize_with = "lenient_series",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub daily_activation_goals: Series,
}

/// The measured series that can be summed across devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesField {
    MonthlyConsumption,
    DailyConsumption,
    MonthlyWithoutSystem,
    DailyWithoutSystem,
    MonthlyDowntimeMinutes,
    DailyDowntimeMinutes,
    MonthlyOccupancy,
    DailyOccupancy,
}

impl SeriesField {
    pub const ALL: [SeriesField; 8] = [
        SeriesField::MonthlyConsumption,
        SeriesField::DailyConsumption,
        SeriesField::MonthlyWithoutSystem,
        SeriesField::DailyWithoutSystem,
        SeriesField::MonthlyDowntimeMinutes,
        SeriesField::DailyDowntimeMinutes,
        SeriesField::MonthlyOccupancy,
        SeriesField::DailyOccupancy,
    ];

    pub fn period_kind(&self) -> PeriodKind {
        match self {
            SeriesField::MonthlyConsumption
            | SeriesField::MonthlyWithoutSystem
            | SeriesField::MonthlyDowntimeMinutes
            | SeriesField::MonthlyOccupancy => PeriodKind::Monthly,
            SeriesField::DailyConsumption
            | SeriesField::DailyWithoutSystem
            | SeriesField::DailyDowntimeMinutes
            | SeriesField::DailyOccupancy => PeriodKind::Daily,
        }
    }

    /// Fixed length downstream charts index into.
    pub fn expected_len(&self) -> usize {
        self.period_kind().series_len()
    }

    /// Field name on the wire.
    pub fn api_name(&self) -> &'static str {
        match self {
            SeriesField::MonthlyConsumption => "consumo_mensal",
            SeriesField::DailyConsumption => "consumo_diario_mes_corrente",
            SeriesField::MonthlyWithoutSystem => "consumo_sem_sistema_mensal",
            SeriesField::DailyWithoutSystem => "consumo_sem_sistema_diario",
            SeriesField::MonthlyDowntimeMinutes => "minutos_desligado_mensal",
            SeriesField::DailyDowntimeMinutes => "minutos_desligado_diario",
            SeriesField::MonthlyOccupancy => "ocupacao_mensal",
            SeriesField::DailyOccupancy => "ocupacao_diaria",
        }
    }

    pub fn is_occupancy(&self) -> bool {
        matches!(
            self,
            SeriesField::MonthlyOccupancy | SeriesField::DailyOccupancy
        )
    }
}

impl DeviceData {
    pub fn series(&self, field: SeriesField) -> &Series {
        match field {
            SeriesField::MonthlyConsumption => &self.monthly_consumption,
            SeriesField::DailyConsumption => &self.daily_consumption,
            SeriesField::MonthlyWithoutSystem => &self.monthly_without_system,
            SeriesField::DailyWithoutSystem => &self.daily_without_system,
            SeriesField::MonthlyDowntimeMinutes => &self.monthly_downtime_minutes,
            SeriesField::DailyDowntimeMinutes => &self.daily_downtime_minutes,
            SeriesField::MonthlyOccupancy => &self.monthly_occupancy,
            SeriesField::DailyOccupancy => &self.daily_occupancy,
        }
    }

    pub fn series_mut(&mut self, field: SeriesField) -> &mut Series {
        match field {
            SeriesField::MonthlyConsumption => &mut self.monthly_consumption,
            SeriesField::DailyConsumption => &mut self.daily_consumption,
            SeriesField::MonthlyWithoutSystem => &mut self.monthly_without_system,
            SeriesField::DailyWithoutSystem => &mut self.daily_without_system,
            SeriesField::MonthlyDowntimeMinutes => &mut self.monthly_downtime_minutes,
            SeriesField::DailyDowntimeMinutes => &mut self.daily_downtime_minutes,
            SeriesField::MonthlyOccupancy => &mut self.monthly_occupancy,
            SeriesField::DailyOccupancy => &mut self.daily_occupancy,
        }
    }

    pub fn consumption(&self, kind: PeriodKind) -> &Series {
        match kind {
            PeriodKind::Monthly => &self.monthly_consumption,
            PeriodKind::Daily => &self.daily_consumption,
        }
    }

    pub fn without_system(&self, kind: PeriodKind) -> &Series {
        match kind {
            PeriodKind::Monthly => &self.monthly_without_system,
            PeriodKind::Daily => &self.daily_without_system,
        }
    }

    pub fn downtime_minutes(&self, kind: PeriodKind) -> &Series {
        match kind {
            PeriodKind::Monthly => &self.monthly_downtime_minutes,
            PeriodKind::Daily => &self.daily_downtime_minutes,
        }
    }
}

/// Coerce one JSON element the way the dashboard always has: numbers pass
/// through, numeric strings parse, null stays absent, everything else is 0.
/// Non-finite results (`"inf"`, `"NaN"`) also count as 0.
pub fn coerce_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Some(number.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Decode a series element by element. Elements are captured as raw text
/// first so a number outside the f64 range only zeroes its own slot.
fn lenient_series<'de, D>(deserializer: D) -> Result<Series, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    let items: Vec<Box<RawValue>> = match serde_json::from_str(raw.get()) {
        Ok(items) => items,
        Err(_) => return Ok(Vec::new()),
    };

    Ok(items
        .iter()
        .map(|item| match serde_json::from_str::<Value>(item.get()) {
            Ok(value) => coerce_value(&value),
            Err(_) => Some(0.0),
        })
        .collect())
}
