use crate::error::ModelError;
use crate::ml::model::ScoringModel;

/// `bias + Σ wᵢ·xᵢ` with fixed importances.
///
/// Deterministic stand-in for a trained model, used by tests and for
/// experimenting with hand-set coefficients.
#[derive(Debug, Clone)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub importances: Vec<f64>,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64, importances: Vec<f64>) -> Self {
        Self {
            weights,
            bias,
            importances,
        }
    }

    /// Always predicts `value`, with uniform importances.
    pub fn constant(value: f64, dim: usize) -> Self {
        Self {
            weights: vec![0.0; dim],
            bias: value,
            importances: vec![1.0 / dim.max(1) as f64; dim],
        }
    }
}

impl ScoringModel for LinearModel {
    fn input_dim(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, scaled: &[f64]) -> Result<f64, ModelError> {
        if scaled.len() != self.weights.len() {
            return Err(ModelError::DimensionMismatch {
                got: scaled.len(),
                expected: self.weights.len(),
            });
        }
        let y = self
            .weights
            .iter()
            .zip(scaled)
            .fold(self.bias, |acc, (w, x)| acc + w * x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(ModelError::NonFiniteOutput { value: y })
        }
    }

    fn importances(&self) -> &[f64] {
        &self.importances
    }

    fn name(&self) -> &str {
        "linear"
    }
}
