use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::answers::AnswerValue;
use super::categories::CategoryTable;
use super::rules::{Dimension, Rule};

const COMPACT_PRESET: &str = include_str!("../../presets/compact.json");
const ORIGINAL_PRESET: &str = include_str!("../../presets/original.json");

/// Starting point and clamp range of one score dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub start: f64,
    pub min: f64,
    pub max: f64,
}

impl DimensionSpec {
    pub fn new(start: f64, min: f64, max: f64) -> Self {
        Self { start, min, max }
    }

    /// Applied once, after every rule has been summed. NaN collapses to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    pub overall: DimensionSpec,
    pub physical: DimensionSpec,
    pub mental: DimensionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<DimensionSpec>,
}

impl DimensionTable {
    pub fn get(&self, dimension: Dimension) -> Option<&DimensionSpec> {
        match dimension {
            Dimension::Overall => Some(&self.overall),
            Dimension::Physical => Some(&self.physical),
            Dimension::Mental => Some(&self.mental),
            Dimension::Lifestyle => self.lifestyle.as_ref(),
        }
    }
}

/// Complete, data-driven description of a scoring variant.
///
/// The overall dimension is a risk score (higher is riskier, categories ascend in severity);
/// physical, mental and lifestyle are wellness scores (higher is healthier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub dimensions: DimensionTable,
    #[serde(default)]
    pub defaults: BTreeMap<String, AnswerValue>,
    pub rules: Vec<Rule>,
    pub categories: CategoryTable,
    pub default_recommendation: String,
}

impl RuleConfig {
    pub fn from_json(raw: &str) -> Result<Self, RuleConfigError> {
        let config: RuleConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RuleConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Named built-in tables: `standard` (0-1000), `compact` (0-100) and `original`.
    ///
    /// `original` is the deduct-from-1000 wellness table; its overall score is higher when
    /// healthier, so its bands run from most to least severe.
    pub fn preset(name: &str) -> Result<Self, RuleConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "" => Ok(Self::standard()),
            "compact" | "lite" => Self::from_json(COMPACT_PRESET),
            "original" | "classic" => Self::from_json(ORIGINAL_PRESET),
            other => Err(RuleConfigError::UnknownPreset(other.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), RuleConfigError> {
        for dimension in Dimension::ALL {
            let Some(spec) = self.dimensions.get(dimension) else {
                continue;
            };
            if ![spec.start, spec.min, spec.max].iter().all(|v| v.is_finite()) {
                return Err(RuleConfigError::NonFinite {
                    location: format!("dimension '{}'", dimension.label()),
                });
            }
            if spec.min > spec.max {
                return Err(RuleConfigError::InvalidRange {
                    dimension,
                    min: spec.min,
                    max: spec.max,
                });
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleConfigError::DuplicateRule(rule.id.clone()));
            }
            let amounts = rule.deltas.iter().map(|delta| delta.amount);
            if !amounts
                .chain(rule.when.thresholds())
                .all(|value| value.is_finite())
            {
                return Err(RuleConfigError::NonFinite {
                    location: format!("rule '{}'", rule.id),
                });
            }
        }

        self.categories.validate()
    }
}

/// Errors raised while loading or validating a rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleConfigError {
    #[error("failed to read rule table {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("rule table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown rule preset '{0}' (expected 'standard', 'compact' or 'original')")]
    UnknownPreset(String),
    #[error("dimension {dimension:?} has min {min} above max {max}")]
    InvalidRange {
        dimension: Dimension,
        min: f64,
        max: f64,
    },
    #[error("non-finite number in {location}")]
    NonFinite { location: String },
    #[error("rule id '{0}' appears more than once")]
    DuplicateRule(String),
    #[error("category table needs at least one band")]
    EmptyCategories,
    #[error("category '{label}' bound must be greater than the previous band")]
    UnorderedCategories { label: String },
    #[error("catch-all category '{label}' must be the last band")]
    CatchAllNotLast { label: String },
}
