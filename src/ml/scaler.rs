use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Pre-fitted z-score transform. Parameters are fixed at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Result<Self, ModelError> {
        let scaler = Self { mean, std };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Identity transform of width `dim`.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            std: vec![1.0; dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.len() != self.std.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "scaler mean len {} != std len {}",
                self.mean.len(),
                self.std.len()
            )));
        }
        if self.mean.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidArtifact(
                "scaler mean must be finite".to_string(),
            ));
        }
        if self.std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ModelError::InvalidArtifact(
                "scaler std must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f64>, ModelError> {
        if raw.len() != self.dim() {
            return Err(ModelError::DimensionMismatch {
                got: raw.len(),
                expected: self.dim(),
            });
        }
        Ok(raw
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_each_column() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 0.5]).unwrap();
        let z = scaler.transform(&[14.0, -1.0]).unwrap();
        assert_eq!(z, vec![2.0, -2.0]);
    }

    #[test]
    fn test_rejects_zero_std_and_width_mismatch() {
        assert!(StandardScaler::new(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());

        let scaler = StandardScaler::identity(3);
        assert!(matches!(
            scaler.transform(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch {
                got: 2,
                expected: 3
            })
        ));
    }
}
