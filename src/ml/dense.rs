//! Dense feed-forward regression network (CPU-only).
//!
//! Weights are loaded from JSON and evaluated with plain `f64` arithmetic.
//! Inputs are expected to be already standardized; see [`super::scaler`].
//! Shape problems are rejected at load time so inference only has to check
//! the input width.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Row-major weights, shape [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Shape [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn out_dim(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let sum = row.iter().zip(x).fold(*b, |acc, (w, v)| acc + w * v);
                self.activation.apply(sum)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Check every layer chains onto the previous one and ends in a scalar.
    pub fn validate(&self, input_dim: usize) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "network has no layers".to_string(),
            ));
        }

        let mut expected_in = input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer[{idx}] has no outputs"
                )));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                )));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(ModelError::InvalidArtifact(format!(
                        "layer[{idx}] row {r} len {} != in_dim {expected_in}",
                        row.len()
                    )));
                }
            }
            let finite = layer
                .weights
                .iter()
                .flatten()
                .chain(layer.bias.iter())
                .all(|v| v.is_finite());
            if !finite {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer[{idx}] contains non-finite parameters"
                )));
            }
            expected_in = layer.out_dim();
        }

        if expected_in != 1 {
            return Err(ModelError::InvalidArtifact(format!(
                "regression network must end in 1 output, got {expected_in}"
            )));
        }
        Ok(())
    }

    pub fn input_dim(&self) -> usize {
        self.layers
            .first()
            .and_then(|l| l.weights.first())
            .map(|r| r.len())
            .unwrap_or(0)
    }

    /// Evaluate the network to a single output.
    pub fn forward_scalar(&self, input: &[f64]) -> Result<f64, ModelError> {
        let expected = self.input_dim();
        if input.len() != expected {
            return Err(ModelError::DimensionMismatch {
                got: input.len(),
                expected,
            });
        }

        let out = self
            .layers
            .iter()
            .fold(input.to_vec(), |x, layer| layer.forward(&x));

        match out.as_slice() {
            [value] if value.is_finite() => Ok(*value),
            [value] => Err(ModelError::NonFiniteOutput { value: *value }),
            other => Err(ModelError::DimensionMismatch {
                got: other.len(),
                expected: 1,
            }),
        }
    }
}
