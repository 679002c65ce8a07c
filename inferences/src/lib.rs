//! Runtime for the pre-trained wage regressors.
//!
//! Artifacts are either ONNX graphs (executed with tract) or linear models
//! exported as JSON. Both score a single named-column [`FeatureRow`].

pub mod inference;
pub mod linear;
pub mod types;

pub use inference::{load_artifact, OnnxRegressor, Regressor};
pub use linear::LinearRegressor;
pub use types::FeatureRow;
