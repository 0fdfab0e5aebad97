use std::collections::BTreeMap;

use super::answers::{AnswerSet, AnswerValue};

pub const HEIGHT_FIELD: &str = "height";
pub const WEIGHT_FIELD: &str = "weight";
pub const BMI_FIELD: &str = "bmi";

/// Normalized view over an [`AnswerSet`] with field defaults and derived readings applied.
///
/// This is the only place defaults are resolved; rules never look at raw answers directly.
#[derive(Debug)]
pub struct Profile<'a> {
    answers: &'a AnswerSet,
    defaults: &'a BTreeMap<String, AnswerValue>,
    bmi: Option<f64>,
}

impl<'a> Profile<'a> {
    pub fn normalize(answers: &'a AnswerSet, defaults: &'a BTreeMap<String, AnswerValue>) -> Self {
        let mut profile = Self {
            answers,
            defaults,
            bmi: None,
        };
        profile.bmi = profile.derive_bmi();
        profile
    }

    fn derive_bmi(&self) -> Option<f64> {
        let height_m = self.raw_number(HEIGHT_FIELD)? / 100.0;
        let weight = self.raw_number(WEIGHT_FIELD)?;
        if height_m <= 0.0 {
            return None;
        }
        let bmi = weight / (height_m * height_m);
        bmi.is_finite().then_some(bmi)
    }

    fn raw_number(&self, field: &str) -> Option<f64> {
        let answered = self.answers.get(field).and_then(AnswerValue::as_number);
        answered.or_else(|| self.defaults.get(field).and_then(AnswerValue::as_number))
    }

    pub fn bmi(&self) -> Option<f64> {
        self.bmi
    }

    /// Whether the client actually answered the field (defaults do not count).
    pub fn answered(&self, field: &str) -> bool {
        if field == BMI_FIELD {
            return self.bmi.is_some();
        }
        self.answers.get(field).is_some()
    }

    /// The submitted answer, or the configured default when the field is missing.
    pub fn value(&self, field: &str) -> Option<&AnswerValue> {
        self.answers.get(field).or_else(|| self.defaults.get(field))
    }

    /// Numeric reading; an unparseable answer falls back to the field default.
    pub fn number(&self, field: &str) -> Option<f64> {
        if field == BMI_FIELD {
            return self.bmi;
        }
        self.raw_number(field)
    }

    pub fn text(&self, field: &str) -> Option<String> {
        if field == BMI_FIELD {
            return self.bmi.map(|bmi| format!("{bmi:.1}"));
        }
        self.value(field)
            .map(AnswerValue::to_text)
            .filter(|text| !text.is_empty())
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        let answered = self.answers.get(field).and_then(AnswerValue::as_flag);
        answered.or_else(|| self.defaults.get(field).and_then(AnswerValue::as_flag))
    }

    /// Collection reading, never empty when a default exists for the field.
    pub fn items(&self, field: &str) -> Vec<String> {
        let answered = self
            .answers
            .get(field)
            .map(AnswerValue::items)
            .unwrap_or_default();
        if !answered.is_empty() {
            return answered;
        }
        self.defaults
            .get(field)
            .map(AnswerValue::items)
            .unwrap_or_default()
    }
}
