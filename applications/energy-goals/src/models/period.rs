use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Granularity of a goal or consumption series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Monthly,
    Daily,
}

impl PeriodKind {
    pub const MONTHS_PER_YEAR: usize = 12;
    pub const MAX_DAYS_PER_MONTH: usize = 31;

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Monthly => "monthly",
            PeriodKind::Daily => "daily",
        }
    }

    /// Fixed positional length of a series of this kind.
    pub fn series_len(&self) -> usize {
        match self {
            PeriodKind::Monthly => Self::MONTHS_PER_YEAR,
            PeriodKind::Daily => Self::MAX_DAYS_PER_MONTH,
        }
    }

    pub fn contains_index(&self, index: u32) -> bool {
        (index as usize) < self.series_len()
    }

    /// Chart label for the period at `index`: `Jan`..`Dec` or `D1`..`D31`.
    pub fn label(&self, index: usize) -> String {
        match self {
            PeriodKind::Monthly => MONTH_LABELS[index % Self::MONTHS_PER_YEAR].to_string(),
            PeriodKind::Daily => format!("D{}", index + 1),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PeriodKind::Monthly),
            "daily" => Ok(PeriodKind::Daily),
            other => Err(format!("unknown period kind: {}", other)),
        }
    }
}

/// Identity of a monitored device, or the `all` rollup sentinel.
///
/// Ids arrive either as integers (`33`) or strings (`"33"`, `"all"`); both
/// forms canonicalize to the same trimmed decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub const ALL: &'static str = "all";

    pub fn all() -> Self {
        EntityId(Self::ALL.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id.to_string())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.trim().to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::from(id.as_str())
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("entity id cannot be empty".to_string());
        }
        Ok(EntityId(trimmed.to_string()))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(id) => Ok(EntityId::from(id)),
            RawId::Text(id) => id.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_kind_parsing_is_case_insensitive() {
        assert_eq!("Monthly".parse::<PeriodKind>().unwrap(), PeriodKind::Monthly);
        assert_eq!(" daily ".parse::<PeriodKind>().unwrap(), PeriodKind::Daily);
        assert!("weekly".parse::<PeriodKind>().is_err());
    }

    #[test]
    fn test_period_kind_index_domain() {
        assert!(PeriodKind::Monthly.contains_index(11));
        assert!(!PeriodKind::Monthly.contains_index(12));
        assert!(PeriodKind::Daily.contains_index(30));
        assert!(!PeriodKind::Daily.contains_index(31));
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(PeriodKind::Monthly.label(0), "Jan");
        assert_eq!(PeriodKind::Monthly.label(11), "Dec");
        assert_eq!(PeriodKind::Daily.label(0), "D1");
        assert_eq!(PeriodKind::Daily.label(30), "D31");
    }

    #[test]
    fn test_entity_id_canonicalization() {
        assert_eq!(EntityId::from(33u32), EntityId::from(" 33 "));
        assert!(EntityId::from("all").is_all());
        assert!("  ".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_entity_id_deserializes_from_number_or_string() {
        let from_int: EntityId = serde_json::from_str("33").unwrap();
        let from_text: EntityId = serde_json::from_str("\"33\"").unwrap();
        assert_eq!(from_int, from_text);
        assert_eq!(serde_json::to_string(&from_int).unwrap(), "\"33\"");
    }
}
