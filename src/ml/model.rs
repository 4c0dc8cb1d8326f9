//! Scoring model capability and its production implementation.
//!
//! The scorer only needs two things from a model: a scalar prediction for a
//! standardized feature vector, and a static per-feature importance vector
//! fixed at training time. Anything providing those can be swapped in.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};
use crate::error::{ModelError, Result};
use crate::ml::dense::DenseNetwork;
use crate::ml::scaler::StandardScaler;

const EMBEDDED_ARTIFACT: &str = include_str!("../../models/default_scorer.json");

/// A pre-trained regression model.
pub trait ScoringModel: Send + Sync {
    /// Width of the feature vector the model was trained on.
    fn input_dim(&self) -> usize;

    /// Raw score for an already-standardized feature vector.
    fn predict(&self, scaled: &[f64]) -> std::result::Result<f64, ModelError>;

    /// Per-feature importances, same order as the inputs.
    fn importances(&self) -> &[f64];

    fn name(&self) -> &str {
        "model"
    }
}

/// On-disk model: feature order, fitted scaler, network and importances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub network: DenseNetwork,
    pub importances: Vec<f64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ModelArtifact {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let artifact = Self::from_json(&content)?;
        info!(
            "Loaded scoring model from {} ({})",
            path.as_ref().display(),
            artifact.version()
        );
        Ok(artifact)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// The artifact compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_ARTIFACT)
    }

    pub fn version(&self) -> &str {
        self.metadata
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unversioned")
    }

    pub fn validate(&self) -> std::result::Result<(), ModelError> {
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                got: self.feature_names.len(),
                expected: FEATURE_COUNT,
            });
        }
        for (index, (got, expected)) in self.feature_names.iter().zip(FEATURE_NAMES).enumerate() {
            if got != expected {
                return Err(ModelError::FeatureOrder {
                    index,
                    got: got.clone(),
                    expected: expected.to_string(),
                });
            }
        }

        self.scaler.validate()?;
        if self.scaler.dim() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                got: self.scaler.dim(),
                expected: FEATURE_COUNT,
            });
        }

        self.network.validate(FEATURE_COUNT)?;

        if self.importances.len() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                got: self.importances.len(),
                expected: FEATURE_COUNT,
            });
        }
        if self.importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ModelError::InvalidArtifact(
                "importances must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Split into the model and the scaler the scorer holds separately.
    pub fn into_parts(self) -> (DenseRegressor, StandardScaler) {
        let version = self.version().to_string();
        let model = DenseRegressor {
            network: self.network,
            importances: self.importances,
            version,
        };
        (model, self.scaler)
    }
}

/// Dense-network regressor loaded from a [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct DenseRegressor {
    network: DenseNetwork,
    importances: Vec<f64>,
    version: String,
}

impl ScoringModel for DenseRegressor {
    fn input_dim(&self) -> usize {
        self.network.input_dim()
    }

    fn predict(&self, scaled: &[f64]) -> std::result::Result<f64, ModelError> {
        self.network.forward_scalar(scaled)
    }

    fn importances(&self) -> &[f64] {
        &self.importances
    }

    fn name(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_artifact_is_valid() {
        let artifact = ModelArtifact::embedded().unwrap();
        assert_eq!(artifact.feature_names.len(), FEATURE_COUNT);
        let sum: f64 = artifact.importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let (model, scaler) = artifact.into_parts();
        assert_eq!(model.input_dim(), FEATURE_COUNT);
        assert_eq!(scaler.dim(), FEATURE_COUNT);
    }

    #[test]
    fn test_embedded_model_centers_on_mid_scale() {
        let (model, scaler) = ModelArtifact::embedded().unwrap().into_parts();
        let at_mean = scaler.transform(&scaler.mean.clone()).unwrap();
        let y = model.predict(&at_mean).unwrap();
        assert!((y - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_reordered_features() {
        let mut artifact = ModelArtifact::embedded().unwrap();
        artifact.feature_names.swap(0, 1);
        assert!(matches!(
            artifact.validate(),
            Err(ModelError::FeatureOrder { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_short_importances() {
        let mut artifact = ModelArtifact::embedded().unwrap();
        artifact.importances.pop();
        assert!(artifact.validate().is_err());
    }
}
