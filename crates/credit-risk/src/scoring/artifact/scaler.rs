use serde::{Deserialize, Serialize};

use super::super::scorer::ScoringError;

/// Column-wise standardisation fitted offline: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Scaler that leaves `n` columns untouched.
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "scaler mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(index) = self
            .mean
            .iter()
            .chain(self.scale.iter())
            .position(|value| !value.is_finite())
        {
            return Err(format!("scaler parameter {index} is not finite"));
        }
        Ok(())
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if row.len() != self.n_features() {
            return Err(ScoringError::ArityMismatch {
                stage: "scaler",
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                // zero-variance columns are fitted with a unit scale
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}
