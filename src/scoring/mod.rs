pub mod explain;
pub mod features;
pub mod scorer;

pub use explain::explain;
pub use features::extract_features;
pub use scorer::Scorer;
