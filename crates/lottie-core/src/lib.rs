//! Animation setup for Lottie compositions on a native layer backend.
//!
//! A [`CompositionDriver`] builds the layer tree of a [`LottieAsset`], hands
//! every layer an immutable [`LayerAnimationContext`] and attaches the
//! resulting [`CurveAnimation`]s, plus one `currentFrame` master clock, to
//! the layers' [`NativeLayer`] backings.

pub mod asset;
pub mod backing;
pub mod compatibility;
pub mod context;
pub mod curve;
pub mod driver;
pub mod error;
pub mod keypath;
pub mod layers;
mod property;
pub mod text;
pub mod timing;
pub mod value_provider;

pub use asset::{ImageSource, LottieAsset};
pub use backing::{LayerBacking, NativeLayer, StagedAnimations};
pub use compatibility::{CompatibilityIssue, CompatibilityMode, CompatibilityTracker};
pub use context::{LayerAnimationContext, TimeRemapping};
pub use curve::{CalculationMode, CurveAnimation, CurveKind, CurveValue, TimingFunction};
pub use driver::{CompositionDriver, FailedLayer, MasterClock, PlaybackOptions, SetupReport};
pub use error::{AssetError, SetupError};
pub use keypath::AnimationKeypath;
pub use layers::{AnimationLayer, CompositionLayer};
pub use text::{DefaultTextProvider, DictionaryTextProvider, TextProvider};
pub use timing::{FillMode, LoopMode, TimingConfiguration};
pub use value_provider::{ValueProvider, ValueProviderStore};
