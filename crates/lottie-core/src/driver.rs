//! The root of a setup pass: one context, one master clock.

use crate::asset::LottieAsset;
use crate::backing::{LayerBacking, NativeLayer, StagedAnimations};
use crate::compatibility::{CompatibilityIssue, CompatibilityMode, CompatibilityTracker};
use crate::context::LayerAnimationContext;
use crate::curve::{CurveAnimation, CurveValue};
use crate::error::SetupError;
use crate::keypath::AnimationKeypath;
use crate::layers::CompositionLayer;
use crate::text::TextProvider;
use crate::timing::{LoopMode, TimingConfiguration};
use crate::value_provider::ValueProviderStore;
use serde::Serialize;
use std::cell::RefCell;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Defaults to the asset's start frame.
    pub from_frame: Option<f32>,
    /// Defaults to the asset's end frame.
    pub to_frame: Option<f32>,
    pub loop_mode: LoopMode,
    pub speed: f32,
    pub compatibility_mode: CompatibilityMode,
    /// Leave failing root layers empty instead of aborting the whole pass.
    pub skip_failed_layers: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            from_frame: None,
            to_frame: None,
            loop_mode: LoopMode::PlayOnce,
            speed: 1.0,
            compatibility_mode: CompatibilityMode::Track,
            skip_failed_layers: false,
        }
    }
}

/// The single animation advancing `currentFrame` on the root layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterClock {
    pub from_frame: f32,
    pub to_frame: f32,
    /// Seconds per cycle, `|to - from| / frame_rate`.
    pub duration: f64,
    pub timing: TimingConfiguration,
}

impl MasterClock {
    pub const KEY: &'static str = "currentFrame";

    pub fn new(from_frame: f32, to_frame: f32, frame_rate: f32, timing: TimingConfiguration) -> Self {
        Self {
            from_frame,
            to_frame,
            duration: f64::from((to_frame - from_frame).abs()) / f64::from(frame_rate),
            timing,
        }
    }

    pub fn animation(&self) -> CurveAnimation {
        CurveAnimation::basic(
            CurveValue::Scalar(self.from_frame),
            CurveValue::Scalar(self.to_frame),
            self.duration,
            self.timing,
        )
    }

    /// Frame shown `elapsed` seconds after the clock was attached.
    ///
    /// Before the start and after the last cycle the clock holds its first
    /// and final frames.
    pub fn frame_at(&self, elapsed: f64) -> f32 {
        if self.duration <= 0.0 {
            return self.from_frame;
        }

        let cycle = if self.timing.autoreverses {
            self.duration * 2.0
        } else {
            self.duration
        };
        let active = cycle * f64::from(self.timing.repeat_count);
        let local = ((elapsed + self.timing.time_offset) * f64::from(self.timing.speed))
            .max(0.0)
            .min(active);

        let mut phase = local % cycle;
        if local >= active && local > 0.0 && phase == 0.0 {
            phase = cycle;
        }
        let position = if phase > self.duration {
            cycle - phase
        } else {
            phase
        };

        let progress = (position / self.duration) as f32;
        self.from_frame + (self.to_frame - self.from_frame) * progress
    }
}

/// A root layer left empty by [`PlaybackOptions::skip_failed_layers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedLayer {
    pub name: String,
    pub error: String,
}

/// Outcome of a successful setup pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupReport {
    /// Every property keypath visited, in traversal order.
    pub keypaths: Vec<AnimationKeypath>,
    pub issues: Vec<CompatibilityIssue>,
    pub failed_layers: Vec<FailedLayer>,
    pub clock: MasterClock,
}

/// Owns the layer tree of one asset and runs setup passes over it.
#[derive(Debug)]
pub struct CompositionDriver {
    asset: Arc<LottieAsset>,
    layers: Vec<CompositionLayer>,
    backing: LayerBacking,
    clock: Option<MasterClock>,
}

impl CompositionDriver {
    pub fn new(asset: Arc<LottieAsset>) -> Self {
        let layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        Self {
            asset,
            layers,
            backing: LayerBacking::default(),
            clock: None,
        }
    }

    pub fn asset(&self) -> &LottieAsset {
        &self.asset
    }

    pub fn layers(&self) -> &[CompositionLayer] {
        &self.layers
    }

    /// Depth-first search through root layers and precomposition children.
    pub fn layer_named(&self, name: &str) -> Option<&CompositionLayer> {
        self.layers.iter().find_map(|layer| layer.find(name))
    }

    /// Root backing carrying the `currentFrame` clock.
    pub fn backing(&self) -> &LayerBacking {
        &self.backing
    }

    pub fn clock(&self) -> Option<&MasterClock> {
        self.clock.as_ref()
    }

    fn validate(&self, options: &PlaybackOptions) -> Result<(f32, f32), SetupError> {
        let asset = &self.asset;
        let frame_rate = asset.frame_rate();
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(SetupError::InvalidAsset(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }
        if !asset.start_frame().is_finite()
            || !asset.end_frame().is_finite()
            || asset.start_frame() == asset.end_frame()
        {
            return Err(SetupError::InvalidAsset(format!(
                "invalid frame range {}..{}",
                asset.start_frame(),
                asset.end_frame()
            )));
        }

        let from = options.from_frame.unwrap_or(asset.start_frame());
        let to = options.to_frame.unwrap_or(asset.end_frame());
        if !from.is_finite() || !to.is_finite() {
            return Err(SetupError::InvalidAsset(format!(
                "invalid playback range {from}..{to}"
            )));
        }
        if !options.speed.is_finite() || options.speed < 0.0 {
            return Err(SetupError::InvalidAsset(format!(
                "playback speed must be finite and non-negative, got {}",
                options.speed
            )));
        }
        Ok((from, to))
    }

    /// Builds every layer's curves and the master clock, then attaches them.
    ///
    /// On error nothing changes: previously attached animations stay in place.
    pub fn setup_animations(
        &mut self,
        options: &PlaybackOptions,
        value_providers: &ValueProviderStore,
        text_provider: &dyn TextProvider,
    ) -> Result<SetupReport, SetupError> {
        let (from, to) = self.validate(options)?;
        let timing = options.loop_mode.timing_configuration(options.speed);
        let asset = Arc::clone(&self.asset);
        let _span = tracing::debug_span!("setup_animations", from, to).entered();

        let tracker = CompatibilityTracker::new(options.compatibility_mode);
        let recorded = RefCell::new(Vec::new());
        let record = |keypath: &AnimationKeypath| recorded.borrow_mut().push(keypath.clone());
        let context = LayerAnimationContext::new(&asset, value_providers, &tracker, text_provider)
            .with_frame_window(from, to)
            .with_timing(timing)
            .with_keypath_recorder(&record);

        let mut staged = Vec::with_capacity(self.layers.len());
        let mut failed_layers = Vec::new();
        for layer in &self.layers {
            let checkpoint = recorded.borrow().len();
            match tracker.transaction(|| layer.stage(&context)) {
                Ok(layer_staged) => staged.push(Some(layer_staged)),
                Err(error) if options.skip_failed_layers => {
                    tracing::warn!(layer = layer.name(), %error, "layer setup failed; leaving it empty");
                    recorded.borrow_mut().truncate(checkpoint);
                    failed_layers.push(FailedLayer {
                        name: layer.name().to_string(),
                        error: error.to_string(),
                    });
                    staged.push(None);
                }
                Err(error) => return Err(error),
            }
        }
        drop(context);

        for (layer, layer_staged) in self.layers.iter_mut().zip(staged) {
            match layer_staged {
                Some(layer_staged) => layer.commit(layer_staged),
                None => layer.clear(),
            }
        }

        let clock = MasterClock::new(from, to, asset.frame_rate(), timing);
        let mut root = StagedAnimations::default();
        root.insert(MasterClock::KEY, clock.animation());
        self.backing.commit(root);
        self.clock = Some(clock.clone());

        let report = SetupReport {
            keypaths: recorded.into_inner(),
            issues: tracker.into_issues(),
            failed_layers,
            clock,
        };
        tracing::debug!(
            keypaths = report.keypaths.len(),
            issues = report.issues.len(),
            failed = report.failed_layers.len(),
            "animations attached"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(loop_mode: LoopMode) -> MasterClock {
        MasterClock::new(0.0, 100.0, 25.0, loop_mode.timing_configuration(1.0))
    }

    #[test]
    fn master_duration_is_symmetric() {
        let timing = TimingConfiguration::default();
        let forward = MasterClock::new(10.0, 70.0, 30.0, timing);
        let backward = MasterClock::new(70.0, 10.0, 30.0, timing);
        assert_eq!(forward.duration, 2.0);
        assert_eq!(forward.duration, backward.duration);
    }

    #[test]
    fn master_animation_policy() {
        let animation = clock(LoopMode::PlayOnce).animation();
        assert!(!animation.removed_on_completion);
        assert_eq!(animation.timing, TimingConfiguration::default());
        assert_eq!(animation.duration, 4.0);
        assert_eq!(animation.sample(0.5), Some(CurveValue::Scalar(50.0)));
    }

    #[test]
    fn play_once_holds_the_end_frames() {
        let clock = clock(LoopMode::PlayOnce);
        assert_eq!(clock.frame_at(-1.0), 0.0);
        assert_eq!(clock.frame_at(2.0), 50.0);
        assert_eq!(clock.frame_at(4.0), 100.0);
        assert_eq!(clock.frame_at(10.0), 100.0);
    }

    #[test]
    fn looping_and_ping_pong() {
        assert_eq!(clock(LoopMode::Loop).frame_at(5.0), 25.0);
        assert_eq!(clock(LoopMode::PingPong).frame_at(6.0), 50.0);
        assert_eq!(clock(LoopMode::Repeat(2.0)).frame_at(8.0), 100.0);
        assert_eq!(clock(LoopMode::Repeat(1.5)).frame_at(20.0), 50.0);
    }

    #[test]
    fn reversed_windows_play_backwards() {
        let clock = MasterClock::new(100.0, 0.0, 25.0, TimingConfiguration::default());
        assert_eq!(clock.frame_at(1.0), 75.0);
    }
}
