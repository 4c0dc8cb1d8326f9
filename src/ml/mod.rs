//! Model inference for credit scoring. Models are small JSON artifacts
//! evaluated on the CPU.

pub mod dense;
pub mod linear;
pub mod model;
pub mod scaler;

pub use dense::{Activation, DenseLayer, DenseNetwork};
pub use linear::LinearModel;
pub use model::{DenseRegressor, ModelArtifact, ScoringModel};
pub use scaler::StandardScaler;
