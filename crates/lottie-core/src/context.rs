//! The immutable context each layer receives during animation setup.
//!
//! A [`LayerAnimationContext`] is created once per setup pass by the
//! [`CompositionDriver`](crate::CompositionDriver) and handed down the layer
//! tree. Layers never modify the context they receive: deriving a deeper
//! keypath or an extra time remapping returns a new value, so siblings that
//! derive from the same parent cannot observe each other.

use crate::asset::LottieAsset;
use crate::compatibility::CompatibilityTracker;
use crate::error::SetupError;
use crate::keypath::AnimationKeypath;
use crate::text::TextProvider;
use crate::timing::TimingConfiguration;
use crate::value_provider::{ValueProvider, ValueProviderStore};
use std::fmt;
use std::rc::Rc;

/// Maps a frame in a layer's local time domain to the animation's global
/// frame timeline.
///
/// Remappings are composed, never cached: every query re-runs the whole
/// chain, so frames may be queried in any order.
#[derive(Clone)]
pub struct TimeRemapping(Rc<dyn Fn(f32) -> f32>);

impl TimeRemapping {
    pub fn identity() -> Self {
        TimeRemapping(Rc::new(|frame| frame))
    }

    pub fn from_fn(f: impl Fn(f32) -> f32 + 'static) -> Self {
        TimeRemapping(Rc::new(f))
    }

    /// `frame -> self(inner(frame))`: `inner` runs first, in the child's frame space.
    pub fn then_apply_after(&self, inner: impl Fn(f32) -> f32 + 'static) -> Self {
        let outer = Rc::clone(&self.0);
        TimeRemapping(Rc::new(move |frame| outer(inner(frame))))
    }

    pub fn apply(&self, frame: f32) -> f32 {
        (self.0)(frame)
    }
}

impl Default for TimeRemapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for TimeRemapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimeRemapping(..)")
    }
}

/// Sink invoked with every property keypath finalized during setup.
pub type KeypathRecorder<'a> = &'a dyn Fn(&AnimationKeypath);

#[derive(Clone)]
pub struct LayerAnimationContext<'a> {
    asset: &'a LottieAsset,
    timing: TimingConfiguration,
    start_frame: f32,
    end_frame: f32,
    value_providers: &'a ValueProviderStore,
    compatibility: &'a CompatibilityTracker,
    text_provider: &'a dyn TextProvider,
    keypath: AnimationKeypath,
    time_remapping: TimeRemapping,
    record_keypath: Option<KeypathRecorder<'a>>,
}

impl<'a> LayerAnimationContext<'a> {
    /// Root context: the asset's full frame window, default timing, the
    /// identity remapping and an empty keypath.
    pub fn new(
        asset: &'a LottieAsset,
        value_providers: &'a ValueProviderStore,
        compatibility: &'a CompatibilityTracker,
        text_provider: &'a dyn TextProvider,
    ) -> Self {
        Self {
            asset,
            timing: TimingConfiguration::default(),
            start_frame: asset.start_frame(),
            end_frame: asset.end_frame(),
            value_providers,
            compatibility,
            text_provider,
            keypath: AnimationKeypath::default(),
            time_remapping: TimeRemapping::identity(),
            record_keypath: None,
        }
    }

    pub fn with_frame_window(&self, start_frame: f32, end_frame: f32) -> Self {
        Self {
            start_frame,
            end_frame,
            ..self.clone()
        }
    }

    pub fn with_timing(&self, timing: TimingConfiguration) -> Self {
        Self {
            timing,
            ..self.clone()
        }
    }

    pub fn with_keypath_recorder(&self, recorder: KeypathRecorder<'a>) -> Self {
        Self {
            record_keypath: Some(recorder),
            ..self.clone()
        }
    }

    pub fn adding_keypath_component(&self, component: impl Into<String>) -> Self {
        Self {
            keypath: self.keypath.appending(component),
            ..self.clone()
        }
    }

    /// Composes `additional` in front of the existing remapping: the new
    /// remapping is `frame -> existing(additional(frame))`.
    pub fn with_time_remapping(&self, additional: impl Fn(f32) -> f32 + 'static) -> Self {
        Self {
            time_remapping: self.time_remapping.then_apply_after(additional),
            ..self.clone()
        }
    }

    /// Remapping for a precomposition whose content starts at `start_time`
    /// (in the parent's frames) and runs `time_stretch` times slower.
    pub fn with_simple_time_remapping(&self, start_time: f32, time_stretch: f32) -> Self {
        self.with_time_remapping(move |local_frame| local_frame * time_stretch + start_time)
    }

    pub fn remapped_frame(&self, frame: f32) -> f32 {
        self.time_remapping.apply(frame)
    }

    /// Asset progress of `frame` after remapping; not clamped.
    pub fn progress_time(&self, frame: f32) -> f64 {
        self.asset.progress_time(self.remapped_frame(frame), false)
    }

    /// Seconds of `frame` after remapping.
    pub fn time(&self, frame: f32) -> f64 {
        self.asset.time(self.remapped_frame(frame))
    }

    /// Duration of generated curves; speed is carried by [`Self::timing`].
    pub fn animation_duration(&self) -> f64 {
        self.asset.duration()
    }

    pub fn asset(&self) -> &'a LottieAsset {
        self.asset
    }

    pub fn timing(&self) -> TimingConfiguration {
        self.timing
    }

    pub fn start_frame(&self) -> f32 {
        self.start_frame
    }

    pub fn end_frame(&self) -> f32 {
        self.end_frame
    }

    pub fn keypath(&self) -> &AnimationKeypath {
        &self.keypath
    }

    pub fn value_providers(&self) -> &'a ValueProviderStore {
        self.value_providers
    }

    pub fn compatibility_tracker(&self) -> &'a CompatibilityTracker {
        self.compatibility
    }

    pub fn text_provider(&self) -> &'a dyn TextProvider {
        self.text_provider
    }

    pub fn property_keypath(&self, property: &str) -> AnimationKeypath {
        self.keypath.appending(property)
    }

    pub fn value_provider(&self, property: &str) -> Option<&'a ValueProvider> {
        self.value_providers
            .value_for(&self.property_keypath(property))
    }

    /// Reports `keypath + property` to the recording hook, if one is installed.
    pub fn record_hierarchy_keypath(&self, property: &str) {
        if let Some(record) = self.record_keypath {
            record(&self.property_keypath(property));
        }
    }

    /// Soft compatibility check scoped to the current keypath.
    pub fn assert_compatible(
        &self,
        condition: bool,
        message: impl Into<String>,
    ) -> Result<(), SetupError> {
        self.compatibility.assert(condition, &self.keypath, message)
    }

    pub fn unsupported(&self, feature: impl Into<String>) -> SetupError {
        SetupError::Unsupported {
            keypath: self.keypath.clone(),
            feature: feature.into(),
        }
    }
}

impl fmt::Debug for LayerAnimationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerAnimationContext")
            .field("keypath", &self.keypath)
            .field("start_frame", &self.start_frame)
            .field("end_frame", &self.end_frame)
            .field("timing", &self.timing)
            .field("records_keypaths", &self.record_keypath.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::CompatibilityTracker;
    use crate::text::DefaultTextProvider;
    use serde_json::json;
    use std::cell::RefCell;

    fn asset() -> LottieAsset {
        LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 25, "ip": 0, "op": 100, "w": 100, "h": 100, "layers": []
            }))
            .unwrap(),
        )
    }

    #[test]
    fn identity_remapping_converts_frames_to_seconds() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        assert_eq!(context.time(50.0), 2.0);
        assert_eq!(context.progress_time(50.0), 0.5);
        assert_eq!(context.progress_time(200.0), 2.0);
        assert!(context.keypath().is_empty());
    }

    #[test]
    fn halving_remap_maps_frame_100_to_two_seconds() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .with_time_remapping(|frame| frame / 2.0);

        assert_eq!(context.time(100.0), 2.0);
    }

    #[test]
    fn remaps_compose_outer_after_inner() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let root = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        let f = |frame: f32| frame + 10.0;
        let g = |frame: f32| frame * 3.0;
        let derived = root
            .with_time_remapping(f)
            .adding_keypath_component("Layer")
            .with_time_remapping(g);

        for t in [-5.0, 0.0, 7.0, 33.0] {
            assert_eq!(derived.remapped_frame(t), f(g(t)));
        }
        assert_eq!(root.remapped_frame(7.0), 7.0);
    }

    #[test]
    fn deriving_never_mutates_the_source() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let parent = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .adding_keypath_component("Root");

        let before = (parent.time(40.0), parent.progress_time(40.0));
        let child = parent
            .adding_keypath_component("Child")
            .with_simple_time_remapping(10.0, 2.0);

        assert_eq!((parent.time(40.0), parent.progress_time(40.0)), before);
        assert_eq!(parent.keypath().keys(), ["Root"]);
        assert_eq!(child.keypath().keys(), ["Root", "Child"]);
        assert_eq!(child.remapped_frame(15.0), 40.0);
    }

    #[test]
    fn recorder_receives_property_keypaths() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let recorded = RefCell::new(Vec::new());
        let record = |keypath: &AnimationKeypath| recorded.borrow_mut().push(keypath.full_path());

        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .with_keypath_recorder(&record)
            .adding_keypath_component("Layer 1");
        context.record_hierarchy_keypath("Opacity");

        assert_eq!(*recorded.borrow(), vec!["Layer 1.Opacity".to_string()]);
    }
}
