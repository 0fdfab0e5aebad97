use serde::{Deserialize, Serialize};

use super::config::RuleConfigError;

const UNCLASSIFIED: &str = "Unclassified";

/// One bucket of the category table. A band without `below` is the catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
    pub label: String,
}

impl Band {
    pub fn below(bound: f64, label: &str) -> Self {
        Self {
            below: Some(bound),
            label: label.to_string(),
        }
    }

    pub fn catch_all(label: &str) -> Self {
        Self {
            below: None,
            label: label.to_string(),
        }
    }
}

/// Ordered thresholds over the overall score, ascending in severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    bands: Vec<Band>,
}

impl CategoryTable {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// First band whose bound is strictly greater than `score`; a score sitting exactly on a
    /// bound belongs to the next band.
    pub fn categorize(&self, score: f64) -> &str {
        self.bands
            .iter()
            .find(|band| band.below.map_or(true, |bound| score < bound))
            .or_else(|| self.bands.last())
            .map(|band| band.label.as_str())
            .unwrap_or(UNCLASSIFIED)
    }

    pub(crate) fn validate(&self) -> Result<(), RuleConfigError> {
        if self.bands.is_empty() {
            return Err(RuleConfigError::EmptyCategories);
        }

        let mut previous: Option<f64> = None;
        let last = self.bands.len() - 1;
        for (position, band) in self.bands.iter().enumerate() {
            match band.below {
                None if position != last => {
                    return Err(RuleConfigError::CatchAllNotLast {
                        label: band.label.clone(),
                    });
                }
                None => {}
                Some(bound) if !bound.is_finite() => {
                    return Err(RuleConfigError::NonFinite {
                        location: format!("category '{}'", band.label),
                    });
                }
                Some(bound) => {
                    if previous.is_some_and(|prev| bound <= prev) {
                        return Err(RuleConfigError::UnorderedCategories {
                            label: band.label.clone(),
                        });
                    }
                    previous = Some(bound);
                }
            }
        }

        Ok(())
    }
}
