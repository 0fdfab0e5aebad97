use crate::cli::RuleSourceArgs;
use crate::infra::{build_service, resolve_rules};
use clap::Args;
use lifestyle_risk::assessment::{AnswerSet, AnswerValue, AssessmentReport, RiskScorer};
use lifestyle_risk::config::AppConfig;
use lifestyle_risk::enrichment::EnrichmentMode;
use lifestyle_risk::error::AppError;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with questionnaire answers (reads stdin when omitted)
    pub(crate) file: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) source: RuleSourceArgs,
    /// Ask the configured text generator for recommendations and feedback
    #[arg(long)]
    pub(crate) enrich: bool,
    /// Print the HTTP response body instead of the readable summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one respondent per row and one question per column
    pub(crate) csv: PathBuf,
    #[command(flatten)]
    pub(crate) source: RuleSourceArgs,
    /// Column used to label output rows (defaults to the row number when absent)
    #[arg(long, default_value = "id")]
    pub(crate) id_column: String,
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    #[command(flatten)]
    pub(crate) source: RuleSourceArgs,
}

#[derive(Debug, Serialize)]
struct BatchRow {
    respondent: String,
    risk_score: f64,
    risk_category: String,
    physical_score: f64,
    mental_score: f64,
    lifestyle_score: Option<f64>,
    recommendations: usize,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules = resolve_rules(&args.source, &config.scoring)?;
    let mode = match (args.enrich, config.enrichment.mode) {
        (false, _) => EnrichmentMode::Off,
        (true, EnrichmentMode::Off) => EnrichmentMode::Replace,
        (true, configured) => configured,
    };

    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let answers: AnswerSet = serde_json::from_str(&raw).map_err(io::Error::from)?;

    let service = build_service(rules, &config.enrichment, mode)?;
    let report = service.assess(answers).await;

    if args.json {
        let body = serde_json::to_string_pretty(&report.response()).map_err(io::Error::from)?;
        println!("{body}");
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules = resolve_rules(&args.source, &config.scoring)?;
    let scorer = RiskScorer::new(rules)?;

    let file = File::open(&args.csv)?;
    let scored = score_csv(&scorer, file, io::stdout().lock(), &args.id_column)?;
    eprintln!("Scored {scored} respondents from {}", args.csv.display());
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules = resolve_rules(&args.source, &config.scoring)?;
    let body = serde_json::to_string_pretty(&rules).map_err(io::Error::from)?;
    println!("{body}");
    Ok(())
}

fn render_report(report: &AssessmentReport) {
    let assessment = &report.assessment;
    println!("Lifestyle risk assessment");
    println!(
        "Risk score: {:.0} ({})",
        assessment.overall, assessment.category
    );
    println!(
        "Physical {:.0} | Mental {:.0}",
        assessment.physical, assessment.mental
    );
    if let Some(lifestyle) = assessment.lifestyle {
        println!("Lifestyle {:.0}", lifestyle);
    }

    if !assessment.components.is_empty() {
        println!("Contributing rules:");
        for component in &assessment.components {
            println!(
                "  - {} ({}): {:+.0}",
                component.rule,
                component.dimension.label(),
                component.delta
            );
        }
    }

    println!("Recommendations ({:?}):", report.recommendation_source);
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }

    if let Some(feedback) = &report.text_feedback {
        println!("Feedback: {}", feedback);
    }
}

/// Scores each CSV row and writes one result row per respondent; returns the row count.
pub(crate) fn score_csv<R: Read, W: Write>(
    scorer: &RiskScorer,
    reader: R,
    writer: W,
    id_column: &str,
) -> Result<usize, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(io::Error::from)?.clone();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut scored = 0;
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(io::Error::from)?;
        let mut respondent = (index + 1).to_string();
        let mut answers = AnswerSet::new();

        for (column, value) in headers.iter().zip(record.iter()) {
            if column == id_column {
                if !value.is_empty() {
                    respondent = value.to_string();
                }
                continue;
            }
            answers.insert(column, cell_value(value));
        }

        let assessment = scorer.score(&answers);
        csv_writer
            .serialize(BatchRow {
                respondent,
                risk_score: assessment.overall,
                risk_category: assessment.category,
                physical_score: assessment.physical,
                mental_score: assessment.mental,
                lifestyle_score: assessment.lifestyle,
                recommendations: assessment.recommendations.len(),
            })
            .map_err(io::Error::from)?;
        scored += 1;
    }

    csv_writer.flush()?;
    Ok(scored)
}

/// Multi-select answers are exported as `;`-separated cells.
fn cell_value(raw: &str) -> AnswerValue {
    if raw.contains(';') {
        AnswerValue::List(raw.split(';').map(|item| AnswerValue::from(item.trim())).collect())
    } else {
        AnswerValue::from(raw)
    }
}
