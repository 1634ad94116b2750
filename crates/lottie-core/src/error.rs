use crate::compatibility::CompatibilityIssue;
use crate::keypath::AnimationKeypath;
use thiserror::Error;

/// A layer could not be represented by the active rendering backend.
///
/// Returned from [`AnimationLayer::setup_animations`](crate::AnimationLayer::setup_animations)
/// and propagated up to the root caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("{feature} is not supported by this rendering backend (at `{keypath}`)")]
    Unsupported {
        keypath: AnimationKeypath,
        feature: String,
    },
    #[error("`{keypath}` references missing asset `{ref_id}`")]
    MissingAsset {
        keypath: AnimationKeypath,
        ref_id: String,
    },
    #[error("invalid animation: {0}")]
    InvalidAsset(String),
    #[error("incompatible animation: {0}")]
    Incompatible(CompatibilityIssue),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to parse Lottie JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
