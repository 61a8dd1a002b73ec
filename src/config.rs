//! Validation des blobs JSON de configuration (`roster_config`).
//!
//! Le stockage ne connaît que des paires clé → JSON opaque ; ce module fixe le
//! schéma attendu pour chaque clé reconnue. Un blob illisible dégrade vers la
//! valeur par défaut (avec un avertissement), un blob lisible mais qui viole le
//! contrat échoue immédiatement.

use crate::model::{ConfigEntry, DayStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub const KEY_EXCLUSIONS: &str = "exclusions";
pub const KEY_BUDDY_RULES: &str = "buddy_rules";
pub const KEY_TAGS: &str = "tags";
pub const KEY_SCHEDULING_PARAMS: &str = "scheduling_params";

/// Borne haute de chaque poids ; garde le score dans `i64`.
pub const MAX_WEIGHT: i64 = 1_000_000;

/// Relation nom → ensemble de noms (exclusions, binômes) ou de tags.
pub type NameMap = BTreeMap<String, BTreeSet<String>>;

/// Comportement pour une personne sans entrée de calendrier à une date donnée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityPolicy {
    #[default]
    FailOpen,
    FailClosed,
}

/// Poids du score de classement des candidats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub load_penalty: i64,
    pub buddy_bonus: i64,
    pub role_bonus: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            load_penalty: 10,
            buddy_bonus: 5,
            role_bonus: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingParams {
    pub max_consecutive_days: u32,
    #[serde(default)]
    pub availability_policy: AvailabilityPolicy,
    #[serde(default = "default_unavailable")]
    pub unavailable_statuses: Vec<DayStatus>,
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_unavailable() -> Vec<DayStatus> {
    vec![DayStatus::Home]
}

impl Default for SchedulingParams {
    fn default() -> Self {
        Self {
            max_consecutive_days: 3,
            availability_policy: AvailabilityPolicy::default(),
            unavailable_statuses: default_unavailable(),
            weights: ScoreWeights::default(),
        }
    }
}

/// Configuration typée consommée par le scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub exclusions: NameMap,
    pub buddy_rules: NameMap,
    pub tags: NameMap,
    pub params: SchedulingParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownKey(String),
    Malformed { key: String, reason: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown config key `{key}` ignored"),
            Self::Malformed { key, reason } => {
                write!(f, "config key `{key}` unreadable, using defaults: {reason}")
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required scheduling parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid scheduling parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SchedulingConfig {
    /// Construit la configuration depuis les entrées brutes du stockage.
    pub fn from_entries(
        entries: &[ConfigEntry],
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for entry in entries {
            let value = match unwrap_encoded(&entry.value) {
                Ok(v) => v,
                Err(reason) => {
                    warnings.push(malformed(&entry.key, reason));
                    continue;
                }
            };
            match entry.key.as_str() {
                KEY_EXCLUSIONS => match parse_name_map(&value) {
                    Ok(map) => config.exclusions = map,
                    Err(reason) => warnings.push(malformed(&entry.key, reason)),
                },
                KEY_BUDDY_RULES => match parse_name_map(&value) {
                    Ok(map) => config.buddy_rules = map,
                    Err(reason) => warnings.push(malformed(&entry.key, reason)),
                },
                KEY_TAGS => match parse_name_map(&value) {
                    Ok(map) => config.tags = map,
                    Err(reason) => warnings.push(malformed(&entry.key, reason)),
                },
                KEY_SCHEDULING_PARAMS => {
                    if let Some(params) = parse_params(&entry.key, &value, &mut warnings)? {
                        config.params = params;
                    }
                }
                other => warnings.push(ConfigWarning::UnknownKey(other.to_string())),
            }
        }

        for w in &warnings {
            tracing::warn!(%w, "degraded scheduling config");
        }

        config.validate()?;
        Ok((config, warnings))
    }

    /// Vérifie les invariants typés (utile pour une config construite à la main).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.params.max_consecutive_days == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_consecutive_days",
                reason: "must be at least 1".into(),
            });
        }
        let w = self.params.weights;
        for (name, value) in [
            ("weights.load_penalty", w.load_penalty),
            ("weights.buddy_bonus", w.buddy_bonus),
            ("weights.role_bonus", w.role_bonus),
        ] {
            if !(0..=MAX_WEIGHT).contains(&value) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be between 0 and {MAX_WEIGHT} (got {value})"),
                });
            }
        }
        Ok(())
    }

    /// Les deux personnes sont-elles en relation d'exclusion (dans un sens ou l'autre) ?
    pub fn excludes(&self, a: &str, b: &str) -> bool {
        related(&self.exclusions, a, b)
    }

    pub fn are_buddies(&self, a: &str, b: &str) -> bool {
        related(&self.buddy_rules, a, b)
    }
}

fn related(map: &NameMap, a: &str, b: &str) -> bool {
    map.get(a).is_some_and(|s| s.contains(b)) || map.get(b).is_some_and(|s| s.contains(a))
}

fn malformed(key: &str, reason: String) -> ConfigWarning {
    ConfigWarning::Malformed {
        key: key.to_string(),
        reason,
    }
}

/// Le stockage conserve parfois le JSON sous forme de chaîne encodée.
fn unwrap_encoded(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(raw) => serde_json::from_str(raw).map_err(|e| e.to_string()),
        other => Ok(other.clone()),
    }
}

fn parse_name_map(value: &Value) -> Result<NameMap, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("expected an object, got {}", kind(value)))?;
    let mut out = NameMap::new();
    for (name, targets) in obj {
        let list = targets
            .as_array()
            .ok_or_else(|| format!("entry `{name}`: expected an array, got {}", kind(targets)))?;
        let mut set = BTreeSet::new();
        for t in list {
            let s = t
                .as_str()
                .ok_or_else(|| format!("entry `{name}`: expected strings, got {}", kind(t)))?;
            let s = s.trim();
            if !s.is_empty() && s != name {
                set.insert(s.to_string());
            }
        }
        out.insert(name.clone(), set);
    }
    Ok(out)
}

fn parse_params(
    key: &str,
    value: &Value,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<Option<SchedulingParams>, ConfigError> {
    let Some(obj) = value.as_object() else {
        warnings.push(malformed(key, format!("expected an object, got {}", kind(value))));
        return Ok(None);
    };
    match obj.get("max_consecutive_days") {
        None | Some(Value::Null) => return Err(ConfigError::MissingParameter("max_consecutive_days")),
        Some(v) if v.as_u64().and_then(|n| u32::try_from(n).ok()).is_none() => {
            return Err(ConfigError::InvalidParameter {
                name: "max_consecutive_days",
                reason: format!("expected an integer between 1 and {}, got {v}", u32::MAX),
            })
        }
        Some(_) => {}
    }
    match serde_json::from_value::<SchedulingParams>(value.clone()) {
        Ok(params) => Ok(Some(params)),
        Err(e) => {
            warnings.push(malformed(key, e.to_string()));
            Ok(None)
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
