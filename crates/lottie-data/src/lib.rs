//! Serde data model for the subset of the Lottie JSON format the layer
//! animation engine consumes.

pub mod model;
