//! # vf-materials
//!
//! Prediction boundary for semiconductor transport properties. Device and
//! thermal evaluators never call into this crate; callers that want
//! material-driven constants fit a predictor here and feed its output into
//! their own `MaterialProfile`.

pub mod features;
pub mod predictor;

pub use features::{reference_dataset, MaterialFeatures, MaterialProperties, FEATURE_COUNT};
pub use predictor::{LinearMaterialPredictor, MaterialPredictor, StandardScaler};
