//! Built-in 0-1000 rule table.

use std::collections::BTreeMap;

use super::answers::AnswerValue;
use super::categories::{Band, CategoryTable};
use super::config::{DimensionSpec, DimensionTable, RuleConfig};
use super::rules::Dimension::{Lifestyle, Mental, Overall, Physical};
use super::rules::{Condition, Delta, Rule};

pub const HEALTHY_PROFILE_MESSAGE: &str =
    "Great job! Your answers describe a healthy profile. Keep up your current habits.";

impl RuleConfig {
    pub fn standard() -> Self {
        RuleConfig {
            dimensions: DimensionTable {
                overall: DimensionSpec::new(0.0, 0.0, 1000.0),
                physical: DimensionSpec::new(1000.0, 0.0, 1000.0),
                mental: DimensionSpec::new(1000.0, 0.0, 1000.0),
                lifestyle: Some(DimensionSpec::new(1000.0, 0.0, 1000.0)),
            },
            defaults: standard_defaults(),
            rules: standard_rules(),
            categories: CategoryTable::new(vec![
                Band::below(300.0, "Very Low Risk"),
                Band::below(500.0, "Low Risk"),
                Band::below(700.0, "Moderate Risk"),
                Band::below(850.0, "High Risk"),
                Band::catch_all("Very High Risk"),
            ]),
            default_recommendation: HEALTHY_PROFILE_MESSAGE.to_string(),
        }
    }
}

fn standard_defaults() -> BTreeMap<String, AnswerValue> {
    let none = || AnswerValue::List(vec![AnswerValue::from("none")]);
    BTreeMap::from([
        ("stress".to_string(), AnswerValue::Number(5.0)),
        ("sleep".to_string(), AnswerValue::Number(7.0)),
        ("smoke".to_string(), AnswerValue::from("No")),
        ("conditions".to_string(), none()),
        ("mentalIssues".to_string(), none()),
    ])
}

fn smoker() -> Condition {
    Condition::any(vec![
        Condition::equals("smoke", "yes"),
        Condition::flag("smoke"),
    ])
}

fn standard_rules() -> Vec<Rule> {
    vec![
        Rule::new("age_senior", Condition::at_least("age", 60.0))
            .delta(Delta::fixed(Overall, 150.0))
            .delta(Delta::fixed(Physical, -100.0)),
        Rule::new("age_midlife", Condition::between("age", 45.0, 60.0))
            .delta(Delta::fixed(Overall, 100.0))
            .delta(Delta::fixed(Physical, -50.0)),
        Rule::new("age_adult", Condition::between("age", 30.0, 45.0))
            .delta(Delta::fixed(Overall, 50.0)),
        Rule::new("smoking", smoker())
            .delta(Delta::fixed(Overall, 200.0))
            .delta(Delta::fixed(Physical, -200.0))
            .recommend(
                "Consider a smoking cessation program; quitting is the biggest single \
                 improvement you can make to your health.",
            ),
        Rule::new(
            "smoking_moderate",
            Condition::all(vec![smoker(), Condition::contains("smokeAmount", "10-20")]),
        )
        .delta(Delta::fixed(Overall, 100.0))
        .delta(Delta::fixed(Physical, -100.0)),
        Rule::new(
            "smoking_heavy",
            Condition::all(vec![
                smoker(),
                Condition::contains("smokeAmount", "more than 20"),
            ]),
        )
        .delta(Delta::fixed(Overall, 200.0))
        .delta(Delta::fixed(Physical, -150.0)),
        Rule::new("chronic_conditions", Condition::has_any("conditions"))
            .delta(Delta::per_item(Overall, 75.0, "conditions"))
            .delta(Delta::per_item(Physical, -100.0, "conditions"))
            .recommend("Keep up regular check-ups to manage your chronic conditions ({conditions})."),
        Rule::new("bmi_underweight", Condition::below("bmi", 18.5))
            .delta(Delta::fixed(Overall, 50.0))
            .delta(Delta::fixed(Physical, -100.0))
            .recommend(
                "Your BMI of {bmi} is below the healthy range. Consider speaking to a \
                 nutritionist about healthy weight gain.",
            ),
        Rule::new("bmi_overweight", Condition::between("bmi", 25.0, 30.0))
            .delta(Delta::fixed(Overall, 100.0))
            .delta(Delta::fixed(Physical, -100.0))
            .recommend(
                "Your BMI of {bmi} is in the overweight range. A balanced diet and regular \
                 activity can help.",
            ),
        Rule::new("bmi_obese", Condition::at_least("bmi", 30.0))
            .delta(Delta::fixed(Overall, 200.0))
            .delta(Delta::fixed(Physical, -250.0))
            .recommend(
                "Your BMI of {bmi} is in the obesity range. Consider consulting a healthcare \
                 provider about a weight management plan.",
            ),
        Rule::new("stress_level", Condition::at_least("stress", 0.0))
            .delta(Delta::per_unit(Mental, -30.0, "stress")),
        Rule::new("stress_high", Condition::at_least("stress", 7.0))
            .delta(Delta::fixed(Overall, 150.0))
            .delta(Delta::fixed(Mental, -200.0))
            .recommend(
                "Your stress level is high. Try relaxation techniques such as meditation, \
                 breathing exercises or yoga.",
            ),
        Rule::new("stress_moderate", Condition::between("stress", 4.0, 7.0))
            .delta(Delta::fixed(Overall, 50.0)),
        Rule::new(
            "sleep_short",
            Condition::any(vec![
                Condition::contains("sleep", "less than 5"),
                Condition::below("sleep", 5.0),
            ]),
        )
        .delta(Delta::fixed(Overall, 150.0))
        .delta(Delta::fixed(Mental, -150.0))
        .delta(Delta::fixed(Physical, -50.0))
        .recommend("You are getting too little sleep. Aim for 7-8 hours per night."),
        Rule::new(
            "sleep_reduced",
            Condition::any(vec![
                Condition::contains("sleep", "5-6"),
                Condition::between("sleep", 5.0, 7.0),
            ]),
        )
        .delta(Delta::fixed(Overall, 75.0))
        .delta(Delta::fixed(Mental, -75.0)),
        Rule::new("diet_poor", Condition::equals("diet", "poor"))
            .delta(Delta::fixed(Overall, 100.0))
            .delta(Delta::fixed(Physical, -100.0))
            .recommend("Improve your diet by adding more fruits, vegetables and whole grains."),
        Rule::new("diet_average", Condition::equals("diet", "average"))
            .delta(Delta::fixed(Overall, 50.0))
            .delta(Delta::fixed(Physical, -50.0)),
        Rule::new("exercise_never", Condition::equals("exercise", "never"))
            .delta(Delta::fixed(Overall, 150.0))
            .delta(Delta::fixed(Physical, -150.0))
            .recommend("Start with light physical activity such as a daily 30 minute walk."),
        Rule::new(
            "exercise_rarely",
            Condition::one_of("exercise", &["rarely", "1-2 times a week"]),
        )
        .delta(Delta::fixed(Overall, 75.0))
        .delta(Delta::fixed(Physical, -75.0)),
        Rule::new("exercise_daily", Condition::equals("exercise", "daily"))
            .delta(Delta::fixed(Overall, -50.0)),
        Rule::new("screen_time_high", Condition::contains("screenTime", "more than 6"))
            .delta(Delta::fixed(Overall, 50.0))
            .delta(Delta::fixed(Lifestyle, -150.0))
            .recommend("Try to reduce recreational screen time and take regular breaks."),
        Rule::new("screen_time_moderate", Condition::contains("screenTime", "4-6"))
            .delta(Delta::fixed(Lifestyle, -75.0)),
        Rule::new("no_vacations", Condition::one_of("vacations", &["never", "none"]))
            .delta(Delta::fixed(Lifestyle, -150.0))
            .delta(Delta::fixed(Mental, -50.0))
            .recommend("Plan regular breaks or vacations to recharge."),
        Rule::new("mental_health_issues", Condition::has_any("mentalIssues"))
            .delta(Delta::per_item(Overall, 50.0, "mentalIssues"))
            .delta(Delta::per_item(Mental, -100.0, "mentalIssues"))
            .recommend(
                "Consider talking to a mental health professional about the issues you \
                 reported.",
            ),
        Rule::new(
            "wellbeing_poor",
            Condition::one_of("mentalWellbeing", &["poor", "very poor"]),
        )
        .delta(Delta::fixed(Overall, 50.0))
        .delta(Delta::fixed(Mental, -150.0))
        .recommend(
            "Your mental wellbeing could use attention. Reach out to friends, family or a \
             counsellor.",
        ),
    ]
}
