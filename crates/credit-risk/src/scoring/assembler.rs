use serde::Serialize;

use super::artifact::ArtifactBundle;
use super::domain::{
    ApplicantRecord, Categorical, FeatureVector, HomeOwnership, InvalidCategoryError, LoanGrade,
};

/// Fixed home-ownership codes (alphabetical by label).
pub fn home_ownership_code(value: HomeOwnership) -> usize {
    match value {
        HomeOwnership::Mortgage => 0,
        HomeOwnership::Other => 1,
        HomeOwnership::Own => 2,
        HomeOwnership::Rent => 3,
    }
}

/// Fixed ordinal grade codes, A lowest.
pub fn loan_grade_code(value: LoanGrade) -> usize {
    match value {
        LoanGrade::A => 0,
        LoanGrade::B => 1,
        LoanGrade::C => 2,
        LoanGrade::D => 3,
        LoanGrade::E => 4,
        LoanGrade::F => 5,
        LoanGrade::G => 6,
    }
}

/// Build the model input row for `record`.
///
/// Home ownership and loan grade come from the fixed tables above even though the
/// bundle carries encoders for both; only the loan intent goes through the bundle.
pub fn assemble(
    record: &ApplicantRecord,
    bundle: &ArtifactBundle,
) -> Result<FeatureVector, InvalidCategoryError> {
    let intent_label = record.loan_intent.label();
    let loan_intent_code = bundle
        .loan_intent_encoder()
        .encode(intent_label)
        .ok_or_else(|| InvalidCategoryError::new("loan_intent", intent_label))?;

    Ok(FeatureVector::new([
        f64::from(record.age),
        record.annual_income,
        home_ownership_code(record.home_ownership) as f64,
        record.employment_length_years,
        loan_intent_code as f64,
        loan_grade_code(record.loan_grade) as f64,
        record.loan_amount,
        record.interest_rate_percent,
        record.loan_percent_income,
        f64::from(record.credit_history_length_years),
    ]))
}

/// A label whose fixed code disagrees with the bundled encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncoderDrift {
    pub encoder: &'static str,
    pub label: &'static str,
    pub fixed_code: usize,
    pub bundled_code: Option<usize>,
}

/// Compare the fixed tables against the encoders shipped in the bundle.
pub fn encoder_drift(bundle: &ArtifactBundle) -> Vec<EncoderDrift> {
    let mut drift = Vec::new();

    for value in HomeOwnership::ALL {
        let fixed_code = home_ownership_code(*value);
        let bundled_code = bundle.home_ownership_encoder().encode(value.label());
        if bundled_code != Some(fixed_code) {
            drift.push(EncoderDrift {
                encoder: HomeOwnership::FIELD,
                label: value.label(),
                fixed_code,
                bundled_code,
            });
        }
    }

    for value in LoanGrade::ALL {
        let fixed_code = loan_grade_code(*value);
        let bundled_code = bundle.loan_grade_encoder().encode(value.label());
        if bundled_code != Some(fixed_code) {
            drift.push(EncoderDrift {
                encoder: LoanGrade::FIELD,
                label: value.label(),
                fixed_code,
                bundled_code,
            });
        }
    }

    drift
}
