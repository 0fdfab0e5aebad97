use serde::{Deserialize, Serialize};

use super::profile::{Profile, BMI_FIELD};

/// Score accumulator a rule can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Overall,
    Physical,
    Mental,
    Lifestyle,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Overall,
        Dimension::Physical,
        Dimension::Mental,
        Dimension::Lifestyle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Overall => "overall",
            Dimension::Physical => "physical",
            Dimension::Mental => "mental",
            Dimension::Lifestyle => "lifestyle",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Dimension::Overall => 0,
            Dimension::Physical => 1,
            Dimension::Mental => 2,
            Dimension::Lifestyle => 3,
        }
    }
}

fn default_sentinel() -> String {
    "none".to_string()
}

/// Predicate over a normalized profile.
///
/// Numeric comparisons evaluate false when the field has no numeric reading, which is how
/// BMI-dependent rules are skipped when height is missing or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Above {
        field: String,
        value: f64,
    },
    AtLeast {
        field: String,
        value: f64,
    },
    Below {
        field: String,
        value: f64,
    },
    AtMost {
        field: String,
        value: f64,
    },
    /// Inclusive lower bound, exclusive upper bound.
    Between {
        field: String,
        min: f64,
        max: f64,
    },
    Equals {
        field: String,
        value: String,
    },
    OneOf {
        field: String,
        values: Vec<String>,
    },
    /// Case-insensitive substring match, for multi-select answers sent as free text.
    Contains {
        field: String,
        text: String,
    },
    /// Collection has at least one entry and does not contain the sentinel.
    HasAny {
        field: String,
        #[serde(default = "default_sentinel")]
        sentinel: String,
    },
    Includes {
        field: String,
        value: String,
    },
    Flag {
        field: String,
    },
    Present {
        field: String,
    },
    All {
        conditions: Vec<Condition>,
    },
    Any {
        conditions: Vec<Condition>,
    },
    Not {
        condition: Box<Condition>,
    },
}

impl Condition {
    pub fn above(field: &str, value: f64) -> Self {
        Self::Above {
            field: field.to_string(),
            value,
        }
    }

    pub fn at_least(field: &str, value: f64) -> Self {
        Self::AtLeast {
            field: field.to_string(),
            value,
        }
    }

    pub fn below(field: &str, value: f64) -> Self {
        Self::Below {
            field: field.to_string(),
            value,
        }
    }

    pub fn at_most(field: &str, value: f64) -> Self {
        Self::AtMost {
            field: field.to_string(),
            value,
        }
    }

    pub fn between(field: &str, min: f64, max: f64) -> Self {
        Self::Between {
            field: field.to_string(),
            min,
            max,
        }
    }

    pub fn equals(field: &str, value: &str) -> Self {
        Self::Equals {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn one_of(field: &str, values: &[&str]) -> Self {
        Self::OneOf {
            field: field.to_string(),
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn contains(field: &str, text: &str) -> Self {
        Self::Contains {
            field: field.to_string(),
            text: text.to_string(),
        }
    }

    pub fn has_any(field: &str) -> Self {
        Self::HasAny {
            field: field.to_string(),
            sentinel: default_sentinel(),
        }
    }

    pub fn includes(field: &str, value: &str) -> Self {
        Self::Includes {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn flag(field: &str) -> Self {
        Self::Flag {
            field: field.to_string(),
        }
    }

    pub fn present(field: &str) -> Self {
        Self::Present {
            field: field.to_string(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Self::All { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Any { conditions }
    }

    pub fn negate(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    pub fn matches(&self, profile: &Profile<'_>) -> bool {
        match self {
            Condition::Above { field, value } => compare(profile, field, |n| n > *value),
            Condition::AtLeast { field, value } => compare(profile, field, |n| n >= *value),
            Condition::Below { field, value } => compare(profile, field, |n| n < *value),
            Condition::AtMost { field, value } => compare(profile, field, |n| n <= *value),
            Condition::Between { field, min, max } => {
                compare(profile, field, |n| n >= *min && n < *max)
            }
            Condition::Equals { field, value } => profile
                .text(field)
                .is_some_and(|text| text.eq_ignore_ascii_case(value.trim())),
            Condition::OneOf { field, values } => profile.text(field).is_some_and(|text| {
                values
                    .iter()
                    .any(|value| text.eq_ignore_ascii_case(value.trim()))
            }),
            Condition::Contains { field, text } => {
                let needle = text.to_lowercase();
                profile
                    .text(field)
                    .is_some_and(|haystack| haystack.to_lowercase().contains(&needle))
            }
            Condition::HasAny { field, sentinel } => {
                let items = profile.items(field);
                let sentinel_present = items
                    .iter()
                    .any(|item| item.eq_ignore_ascii_case(sentinel.trim()));
                !sentinel_present && !items.is_empty()
            }
            Condition::Includes { field, value } => profile
                .items(field)
                .iter()
                .any(|item| item.eq_ignore_ascii_case(value.trim())),
            Condition::Flag { field } => profile.flag(field) == Some(true),
            Condition::Present { field } => profile.answered(field),
            Condition::All { conditions } => conditions.iter().all(|c| c.matches(profile)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.matches(profile)),
            Condition::Not { condition } => !condition.matches(profile),
        }
    }

    /// Numeric thresholds carried by this condition, used for config validation.
    pub(crate) fn thresholds(&self) -> Vec<f64> {
        match self {
            Condition::Above { value, .. }
            | Condition::AtLeast { value, .. }
            | Condition::Below { value, .. }
            | Condition::AtMost { value, .. } => vec![*value],
            Condition::Between { min, max, .. } => vec![*min, *max],
            Condition::All { conditions } | Condition::Any { conditions } => {
                conditions.iter().flat_map(Condition::thresholds).collect()
            }
            Condition::Not { condition } => condition.thresholds(),
            _ => Vec::new(),
        }
    }
}

fn compare(profile: &Profile<'_>, field: &str, predicate: impl Fn(f64) -> bool) -> bool {
    profile.number(field).is_some_and(predicate)
}

/// How a delta's amount is multiplied before it is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Fixed,
    /// Multiplied by the number of entries in a collection field.
    PerItem { field: String },
    /// Multiplied by a numeric reading (e.g. stress level).
    PerUnit { field: String },
}

impl Scale {
    fn factor(&self, profile: &Profile<'_>) -> Option<f64> {
        match self {
            Scale::Fixed => Some(1.0),
            Scale::PerItem { field } => Some(profile.items(field).len() as f64),
            Scale::PerUnit { field } => profile.number(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub dimension: Dimension,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "is_fixed")]
    pub scale: Scale,
}

fn is_fixed(scale: &Scale) -> bool {
    *scale == Scale::Fixed
}

impl Delta {
    pub fn fixed(dimension: Dimension, amount: f64) -> Self {
        Self {
            dimension,
            amount,
            scale: Scale::Fixed,
        }
    }

    pub fn per_item(dimension: Dimension, amount: f64, field: &str) -> Self {
        Self {
            dimension,
            amount,
            scale: Scale::PerItem {
                field: field.to_string(),
            },
        }
    }

    pub fn per_unit(dimension: Dimension, amount: f64, field: &str) -> Self {
        Self {
            dimension,
            amount,
            scale: Scale::PerUnit {
                field: field.to_string(),
            },
        }
    }
}

/// Predicate, score deltas and optional recommendation text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub when: Condition,
    #[serde(default)]
    pub deltas: Vec<Delta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Rule {
    pub fn new(id: &str, when: Condition) -> Self {
        Self {
            id: id.to_string(),
            when,
            deltas: Vec::new(),
            recommendation: None,
        }
    }

    pub fn delta(mut self, delta: Delta) -> Self {
        self.deltas.push(delta);
        self
    }

    pub fn recommend(mut self, template: &str) -> Self {
        self.recommendation = Some(template.to_string());
        self
    }

    /// Evaluates the rule; a scale without a reading skips the whole rule.
    pub(crate) fn apply(&self, profile: &Profile<'_>) -> Option<RuleHit> {
        if !self.when.matches(profile) {
            return None;
        }

        let mut components = Vec::with_capacity(self.deltas.len());
        for delta in &self.deltas {
            let factor = delta.scale.factor(profile)?;
            components.push(ScoreComponent {
                rule: self.id.clone(),
                dimension: delta.dimension,
                delta: delta.amount * factor,
            });
        }

        let recommendation = self
            .recommendation
            .as_deref()
            .map(|template| render_template(template, profile));

        Some(RuleHit {
            components,
            recommendation,
        })
    }
}

/// Discrete contribution of a fired rule, kept for audits and debug logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub rule: String,
    pub dimension: Dimension,
    pub delta: f64,
}

pub(crate) struct RuleHit {
    pub components: Vec<ScoreComponent>,
    pub recommendation: Option<String>,
}

/// Replaces `{field}` placeholders; unknown placeholders are left as written.
pub(crate) fn render_template(template: &str, profile: &Profile<'_>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rendered.push_str(&rest[open..]);
            return rendered;
        };

        let name = after[..close].trim();
        match resolve_placeholder(name, profile) {
            Some(value) => rendered.push_str(&value),
            None => rendered.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

fn resolve_placeholder(name: &str, profile: &Profile<'_>) -> Option<String> {
    if name == BMI_FIELD {
        return profile.bmi().map(|bmi| format!("{bmi:.1}"));
    }
    profile.value(name).map(|value| value.to_text())
}
