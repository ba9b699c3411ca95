use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of model inputs produced per applicant.
pub const FEATURE_COUNT: usize = 10;

/// Column names in the order the scaler and classifier were fitted on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "income",
    "home_ownership",
    "employment_length",
    "loan_intent",
    "loan_grade",
    "loan_amount",
    "interest_rate",
    "loan_percent_income",
    "credit_hist_length",
];

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;

/// Raised when a categorical label falls outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a recognised {field} category")]
pub struct InvalidCategoryError {
    pub field: &'static str,
    pub value: String,
}

impl InvalidCategoryError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Raised when a numeric applicant attribute is outside its declared domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct InvalidApplicantError {
    pub field: &'static str,
    pub reason: String,
}

/// Closed categorical domain backed by a fixed label set.
pub trait Categorical: Sized + Copy + PartialEq + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn parse_label(raw: &str) -> Result<Self, InvalidCategoryError> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.label() == raw)
            .ok_or_else(|| InvalidCategoryError::new(Self::FIELD, raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HomeOwnership {
    Rent,
    Own,
    Mortgage,
    Other,
}

impl Categorical for HomeOwnership {
    const FIELD: &'static str = "home_ownership";
    const ALL: &'static [Self] = &[Self::Rent, Self::Own, Self::Mortgage, Self::Other];

    fn label(self) -> &'static str {
        match self {
            Self::Rent => "RENT",
            Self::Own => "OWN",
            Self::Mortgage => "MORTGAGE",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LoanIntent {
    Personal,
    Education,
    Medical,
    Venture,
    DebtConsolidation,
    HomeImprovement,
}

impl Categorical for LoanIntent {
    const FIELD: &'static str = "loan_intent";
    const ALL: &'static [Self] = &[
        Self::Personal,
        Self::Education,
        Self::Medical,
        Self::Venture,
        Self::DebtConsolidation,
        Self::HomeImprovement,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Education => "EDUCATION",
            Self::Medical => "MEDICAL",
            Self::Venture => "VENTURE",
            Self::DebtConsolidation => "DEBTCONSOLIDATION",
            Self::HomeImprovement => "HOMEIMPROVEMENT",
        }
    }
}

/// Lender-assigned grade, A being the least risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Categorical for LoanGrade {
    const FIELD: &'static str = "loan_grade";
    const ALL: &'static [Self] = &[
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }
}

macro_rules! categorical_conversions {
    ($($ty:ty),+) => {$(
        impl FromStr for $ty {
            type Err = InvalidCategoryError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                <$ty as Categorical>::parse_label(raw)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = InvalidCategoryError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                <$ty as Categorical>::parse_label(&raw)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    )+};
}

categorical_conversions!(HomeOwnership, LoanIntent, LoanGrade);

/// Applicant attributes collected for a single scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u32,
    pub annual_income: f64,
    pub employment_length_years: f64,
    pub credit_history_length_years: u32,
    pub home_ownership: HomeOwnership,
    pub loan_intent: LoanIntent,
    pub loan_grade: LoanGrade,
    pub loan_amount: f64,
    pub interest_rate_percent: f64,
    pub loan_percent_income: f64,
}

impl Default for ApplicantRecord {
    /// Values pre-filled on the intake form.
    fn default() -> Self {
        Self {
            age: 30,
            annual_income: 50_000.0,
            employment_length_years: 5.0,
            credit_history_length_years: 5,
            home_ownership: HomeOwnership::Rent,
            loan_intent: LoanIntent::Personal,
            loan_grade: LoanGrade::A,
            loan_amount: 20_000.0,
            interest_rate_percent: 12.5,
            loan_percent_income: 0.3,
        }
    }
}

impl ApplicantRecord {
    /// Check every numeric attribute against its declared domain.
    pub fn validate(&self) -> Result<(), InvalidApplicantError> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(InvalidApplicantError {
                field: "age",
                reason: format!("must be between {MIN_AGE} and {MAX_AGE}, got {}", self.age),
            });
        }

        non_negative("annual_income", self.annual_income)?;
        non_negative("employment_length_years", self.employment_length_years)?;
        non_negative("loan_amount", self.loan_amount)?;
        non_negative("interest_rate_percent", self.interest_rate_percent)?;

        if !(0.0..=1.0).contains(&self.loan_percent_income) {
            return Err(InvalidApplicantError {
                field: "loan_percent_income",
                reason: format!(
                    "must be within [0, 1], got {}",
                    self.loan_percent_income
                ),
            });
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidApplicantError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidApplicantError {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}

/// Fixed-order numeric encoding of an applicant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| self.0[index])
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn to_views(&self) -> Vec<FeatureView> {
        self.named()
            .map(|(name, value)| FeatureView { name, value })
            .collect()
    }
}

/// Single processed input column for diagnostic display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureView {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    pub fn headline(self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "Low Credit Risk Applicant",
            RiskLabel::HighRisk => "High Credit Risk Applicant",
        }
    }
}

/// Default probability paired with the thresholded verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub probability: f64,
    pub label: RiskLabel,
}

impl ScoreResult {
    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::HighRisk
    }

    /// Probability of default as a percentage with two decimals.
    pub fn probability_display(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Everything the presentation layer renders for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub features: FeatureVector,
    pub result: ScoreResult,
}
