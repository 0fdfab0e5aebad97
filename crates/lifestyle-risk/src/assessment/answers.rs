use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single questionnaire answer as submitted by the client.
///
/// The questionnaire front-ends send numbers as strings, multi-selects as either a scalar or an
/// array, and booleans as `"Yes"`/`"No"`; coercion happens lazily through the accessors below so
/// that nothing is rejected up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<AnswerValue>),
}

impl AnswerValue {
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Bool(flag) => Some(Self::Flag(flag)),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::String(text) => Some(Self::Text(text)),
            Value::Array(items) => Some(Self::List(
                items
                    .into_iter()
                    .filter_map(Self::from_json)
                    .filter(|item| !item.is_blank())
                    .collect(),
            )),
        }
    }

    /// Blank text and empty collections count as "not answered".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.iter().all(AnswerValue::is_blank),
            Self::Number(value) => !value.is_finite(),
            Self::Flag(_) => false,
        }
    }

    /// Numeric reading using leading-number coercion (`"7-8"` reads as 7).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) => None,
            Self::Flag(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Self::Text(text) => parse_leading_number(text),
            Self::List(items) => items.first().and_then(AnswerValue::as_number),
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Number(value) => Some(*value != 0.0),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" | "on" => Some(true),
                "no" | "n" | "false" | "0" | "off" => Some(false),
                _ => None,
            },
            Self::List(items) => items.first().and_then(AnswerValue::as_flag),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Number(value) => format_number(*value),
            Self::Text(text) => text.trim().to_string(),
            Self::List(items) => items
                .iter()
                .map(AnswerValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Collection view: scalars become a one-element collection and comma-separated text is
    /// split into one item per entry.
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .iter()
                .map(AnswerValue::to_text)
                .filter(|item| !item.is_empty())
                .collect(),
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            scalar => {
                let text = scalar.to_text();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<AnswerValue>> From<Vec<T>> for AnswerValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Per-request questionnaire answers keyed by question name.
///
/// Deserializes from any JSON object; `null` and nested objects are dropped instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct AnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures and the CLI.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        let key = key.into();
        let value = value.into();
        if value.is_blank() {
            self.answers.remove(&key);
        } else {
            self.answers.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(AnswerValue::to_text)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for AnswerSet {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        raw.into_iter()
            .filter_map(|(key, value)| AnswerValue::from_json(value).map(|value| (key, value)))
            .collect()
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, AnswerValue)>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

/// Reads the longest numeric prefix, ignoring leading whitespace.
pub(crate) fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let mut seen_digit = false;
    let mut seen_dot = false;

    while let Some(&byte) = bytes.get(end) {
        match byte {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }

    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leading_number_parsing_matches_questionnaire_inputs() {
        assert_eq!(parse_leading_number("170"), Some(170.0));
        assert_eq!(parse_leading_number(" 65.5kg"), Some(65.5));
        assert_eq!(parse_leading_number("7-8"), Some(7.0));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("Less than 5"), None);
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn deserialization_drops_nulls_objects_and_blanks() {
        let answers: AnswerSet = serde_json::from_value(json!({
            "age": 40,
            "smoke": "Yes",
            "notes": null,
            "nested": { "ignored": true },
            "diet": "   ",
            "conditions": [],
        }))
        .expect("object deserializes");

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("age"), Some(&AnswerValue::Number(40.0)));
        assert!(answers.get("notes").is_none());
        assert!(answers.get("conditions").is_none());
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        assert!(serde_json::from_value::<AnswerSet>(json!([1, 2, 3])).is_err());
        assert!(serde_json::from_value::<AnswerSet>(json!("age=4")).is_err());
    }

    #[test]
    fn scalars_read_as_single_item_collections() {
        assert_eq!(AnswerValue::from("diabetes").items(), vec!["diabetes"]);
        assert_eq!(
            AnswerValue::from(vec!["diabetes", "asthma"]).items(),
            vec!["diabetes", "asthma"]
        );
        assert_eq!(
            AnswerValue::from("diabetes, asthma,").items(),
            vec!["diabetes", "asthma"]
        );
        assert!(AnswerValue::from(" , ").items().is_empty());
    }

    #[test]
    fn flags_accept_yes_no_strings() {
        assert_eq!(AnswerValue::from("Yes").as_flag(), Some(true));
        assert_eq!(AnswerValue::from("no").as_flag(), Some(false));
        assert_eq!(AnswerValue::from("sometimes").as_flag(), None);
    }
}
