use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::{EntityId, PeriodKind};

const KEY_SEPARATOR: char = '_';

/// Logical namespace a goal lives in. Consumption and activation goals for
/// the same device and period never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    #[serde(rename = "consumption")]
    ConsumptionGoal,
    #[serde(rename = "activation")]
    ActivationGoal,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::ConsumptionGoal, Namespace::ActivationGoal];

    /// Prefix used in serialized storage keys.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            Namespace::ConsumptionGoal => "goal",
            Namespace::ActivationGoal => "activation-goal",
        }
    }

    pub fn from_storage_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.storage_prefix() == prefix)
    }

    /// Name used in URLs and JSON.
    pub fn api_name(&self) -> &'static str {
        match self {
            Namespace::ConsumptionGoal => "consumption",
            Namespace::ActivationGoal => "activation",
        }
    }
}

impl std::str::FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.api_name() == s.trim())
            .ok_or_else(|| format!("unknown goal type: {}", s))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_prefix())
    }
}

/// Composite identity of one storable goal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetaKey {
    pub namespace: Namespace,
    pub entity_id: EntityId,
    pub period_kind: PeriodKind,
    pub period_index: u32,
}

impl MetaKey {
    pub fn new(
        namespace: Namespace,
        entity_id: EntityId,
        period_kind: PeriodKind,
        period_index: u32,
    ) -> Self {
        Self {
            namespace,
            entity_id,
            period_kind,
            period_index,
        }
    }

    /// Deterministic flat key: `{namespace}_{entity}_{kind}_{index}`.
    ///
    /// The entity id is escaped so an id containing `_` cannot collide with
    /// another key; `parse_storage_key` is the exact inverse.
    pub fn storage_key(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.namespace.storage_prefix(),
            escape_segment(self.entity_id.as_str()),
            self.period_kind.as_str(),
            self.period_index,
            sep = KEY_SEPARATOR
        )
    }

    /// Prefix shared by every key of one entity inside a namespace.
    pub fn entity_prefix(namespace: Namespace, entity_id: &EntityId) -> String {
        format!(
            "{}{sep}{}{sep}",
            namespace.storage_prefix(),
            escape_segment(entity_id.as_str()),
            sep = KEY_SEPARATOR
        )
    }

    pub fn parse_storage_key(raw: &str) -> Option<Self> {
        let mut parts = raw.split(KEY_SEPARATOR);
        let namespace = Namespace::from_storage_prefix(parts.next()?)?;
        let entity_id = unescape_segment(parts.next()?)?.parse().ok()?;
        let period_kind = parts.next()?.parse().ok()?;
        let period_index = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(namespace, entity_id, period_kind, period_index))
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// A persisted goal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub key: MetaKey,
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            KEY_SEPARATOR => out.push_str("%5F"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut it = segment.chars();
    while let Some(c) = it.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let code: String = it.by_ref().take(2).collect();
        match code.as_str() {
            "25" => out.push('%'),
            "5F" => out.push(KEY_SEPARATOR),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(entity: &str, kind: PeriodKind, index: u32) -> MetaKey {
        MetaKey::new(Namespace::ConsumptionGoal, EntityId::from(entity), kind, index)
    }

    #[test]
    fn test_storage_key_format() {
        let k = key("33", PeriodKind::Monthly, 5);
        assert_eq!(k.storage_key(), "goal_33_monthly_5");

        let k = MetaKey::new(
            Namespace::ActivationGoal,
            EntityId::from(40u32),
            PeriodKind::Daily,
            12,
        );
        assert_eq!(k.storage_key(), "activation-goal_40_daily_12");
    }

    #[test]
    fn test_separator_in_entity_id_does_not_collide() {
        let a = key("a_b", PeriodKind::Monthly, 1);
        let b = key("a", PeriodKind::Monthly, 1);
        assert_ne!(a.storage_key(), b.storage_key());
        assert_eq!(a.storage_key(), "goal_a%5Fb_monthly_1");
        assert_eq!(MetaKey::parse_storage_key(&a.storage_key()), Some(a));
    }

    #[test]
    fn test_parse_storage_key_inverse() {
        let k = key("50%_off", PeriodKind::Daily, 30);
        assert_eq!(MetaKey::parse_storage_key(&k.storage_key()), Some(k));
    }

    #[test]
    fn test_parse_storage_key_rejects_garbage() {
        assert_eq!(MetaKey::parse_storage_key("goal_33_monthly"), None);
        assert_eq!(MetaKey::parse_storage_key("other_33_monthly_1"), None);
        assert_eq!(MetaKey::parse_storage_key("goal_33_weekly_1"), None);
        assert_eq!(MetaKey::parse_storage_key("goal_33_monthly_x"), None);
        assert_eq!(MetaKey::parse_storage_key("goal_3%Z3_monthly_1"), None);
    }

    #[test]
    fn test_namespace_api_names() {
        assert_eq!("consumption".parse::<Namespace>(), Ok(Namespace::ConsumptionGoal));
        assert_eq!("activation".parse::<Namespace>(), Ok(Namespace::ActivationGoal));
        assert!("goal".parse::<Namespace>().is_err());
        assert_eq!(
            serde_json::to_string(&Namespace::ActivationGoal).unwrap(),
            "\"activation\""
        );
    }

    #[test]
    fn test_entity_prefix_matches_only_that_entity() {
        let prefix = MetaKey::entity_prefix(Namespace::ConsumptionGoal, &EntityId::from("3"));
        assert!(key("3", PeriodKind::Monthly, 0).storage_key().starts_with(&prefix));
        assert!(!key("33", PeriodKind::Monthly, 0).storage_key().starts_with(&prefix));
    }
}
