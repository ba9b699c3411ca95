use chrono::SecondsFormat;
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    ApplicantRecord, Assessment, HomeOwnership, LoanGrade, LoanIntent, ModelInfo, ScoreResponse,
};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::infra::load_service;

/// Applicant attributes; anything omitted falls back to the intake form default.
#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Artifact bundle to score against (defaults to APP_ARTIFACT_PATH)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
    /// Applicant age in years (18-100)
    #[arg(long)]
    pub(crate) age: Option<u32>,
    /// Annual income
    #[arg(long)]
    pub(crate) annual_income: Option<f64>,
    /// Employment length in years
    #[arg(long)]
    pub(crate) employment_length: Option<f64>,
    /// Credit history length in years
    #[arg(long)]
    pub(crate) credit_history_length: Option<u32>,
    /// RENT, OWN, MORTGAGE or OTHER
    #[arg(long)]
    pub(crate) home_ownership: Option<HomeOwnership>,
    /// PERSONAL, EDUCATION, MEDICAL, VENTURE, DEBTCONSOLIDATION or HOMEIMPROVEMENT
    #[arg(long)]
    pub(crate) loan_intent: Option<LoanIntent>,
    /// Loan grade A through G
    #[arg(long)]
    pub(crate) loan_grade: Option<LoanGrade>,
    /// Requested loan amount
    #[arg(long)]
    pub(crate) loan_amount: Option<f64>,
    /// Interest rate in percent
    #[arg(long)]
    pub(crate) interest_rate: Option<f64>,
    /// Loan amount as a fraction of income (0-1)
    #[arg(long)]
    pub(crate) loan_percent_income: Option<f64>,
    /// Print the processed feature vector after the verdict
    #[arg(long)]
    pub(crate) show_features: bool,
    /// Emit the JSON response body instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

impl ScoreArgs {
    pub(crate) fn record(&self) -> ApplicantRecord {
        let defaults = ApplicantRecord::default();
        ApplicantRecord {
            age: self.age.unwrap_or(defaults.age),
            annual_income: self.annual_income.unwrap_or(defaults.annual_income),
            employment_length_years: self
                .employment_length
                .unwrap_or(defaults.employment_length_years),
            credit_history_length_years: self
                .credit_history_length
                .unwrap_or(defaults.credit_history_length_years),
            home_ownership: self.home_ownership.unwrap_or(defaults.home_ownership),
            loan_intent: self.loan_intent.unwrap_or(defaults.loan_intent),
            loan_grade: self.loan_grade.unwrap_or(defaults.loan_grade),
            loan_amount: self.loan_amount.unwrap_or(defaults.loan_amount),
            interest_rate_percent: self.interest_rate.unwrap_or(defaults.interest_rate_percent),
            loan_percent_income: self
                .loan_percent_income
                .unwrap_or(defaults.loan_percent_income),
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let record = args.record();
    let service = load_service(&config, args.artifact.clone())?;
    let assessment = service.assess(&record)?;

    if args.json {
        let body = ScoreResponse::new(&assessment, service.bundle().threshold());
        let rendered = serde_json::to_string_pretty(&body).map_err(std::io::Error::other)?;
        println!("{rendered}");
    } else {
        print!(
            "{}",
            render_assessment(&assessment, &service.model_info(), args.show_features)
        );
    }

    Ok(())
}

pub(crate) fn render_assessment(
    assessment: &Assessment,
    info: &ModelInfo,
    show_features: bool,
) -> String {
    let mut out = String::new();
    let result = assessment.result;

    let _ = writeln!(out, "Credit Risk Prediction System");
    let _ = writeln!(out, "\nPrediction Result");
    let _ = writeln!(out, "- {}", result.label.headline());
    let _ = writeln!(
        out,
        "- Probability of Default: {}",
        result.probability_display()
    );
    let _ = writeln!(
        out,
        "- Decision threshold {:.2} | model {} | loaded {}",
        info.threshold,
        info.model_kind,
        info.loaded_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    for drift in &info.encoder_drift {
        let bundled = drift
            .bundled_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "absent".to_string());
        let _ = writeln!(
            out,
            "! {} '{}' scored as {} but the bundled encoder uses {}",
            drift.encoder, drift.label, drift.fixed_code, bundled
        );
    }

    if show_features {
        let _ = writeln!(out, "\nProcessed Input Data");
        for (name, value) in assessment.features.named() {
            let _ = writeln!(out, "  {name:<20} {value}");
        }
    }

    out
}
