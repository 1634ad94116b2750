//! Turning keyframed properties into native curves.
//!
//! Key times are the asset progress of each keyframe's frame, mapped through
//! the context's time remapping. Values are converted to backend units by
//! the caller (radians, `0..=1` opacity, scale fractions).

use crate::context::LayerAnimationContext;
use crate::curve::{CalculationMode, CurveAnimation, CurveValue, TimingFunction};
use crate::error::SetupError;
use crate::value_provider::ValueProvider;
use glam::Vec2;
use lottie_data::model::{BezierTangent, Keyframe, Property, Value};

struct KeyframeEntry {
    frame: f32,
    value: CurveValue,
    hold: bool,
    easing: TimingFunction,
}

fn easing<T>(keyframe: &Keyframe<T>) -> TimingFunction {
    let out_tangent = keyframe.o.as_ref().and_then(BezierTangent::point);
    let in_tangent = keyframe.i.as_ref().and_then(BezierTangent::point);
    match (out_tangent, in_tangent) {
        (Some((x1, y1)), Some((x2, y2))) => TimingFunction::new(Vec2::new(x1, y1), Vec2::new(x2, y2)),
        _ => TimingFunction::LINEAR,
    }
}

impl<'a> LayerAnimationContext<'a> {
    /// Builds the curve for `property` (a keypath segment such as `"Opacity"`)
    /// from its keyframes, or from a matching value provider.
    ///
    /// Returns `Ok(None)` for properties without any value.
    pub fn property_animation<T>(
        &self,
        property: &str,
        source: &Property<T>,
        convert: impl Fn(&T) -> CurveValue,
    ) -> Result<Option<CurveAnimation>, SetupError> {
        self.record_hierarchy_keypath(property);

        let expected_kind = match &source.k {
            Value::Default => None,
            Value::Static(value) => Some(convert(value).kind()),
            Value::Animated(keyframes) => keyframes
                .iter()
                .find_map(|k| k.s.as_ref())
                .map(|value| convert(value).kind()),
        };
        if let Some(provider) = self.value_provider(property) {
            if let Some(animation) = self.provided_animation(property, provider, expected_kind) {
                return Ok(Some(animation));
            }
        }

        let keypath = self.property_keypath(property);
        self.compatibility_tracker().assert(
            source.x.is_none(),
            &keypath,
            "expressions are not supported; using keyframe values",
        )?;

        match &source.k {
            Value::Default => Ok(None),
            Value::Static(value) => Ok(Some(self.fixed_animation(convert(value)))),
            Value::Animated(keyframes) => self.keyframe_animation(property, keyframes, &convert),
        }
    }

    pub fn fixed_animation(&self, value: CurveValue) -> CurveAnimation {
        CurveAnimation::fixed(value, self.animation_duration(), self.timing())
    }

    /// Discrete `isHidden` curve: hidden before `in_frame` and from `out_frame` on.
    pub fn visibility_animation(&self, in_frame: f32, out_frame: f32) -> CurveAnimation {
        let shown_at = self.progress_time(in_frame);
        let hidden_at = self.progress_time(out_frame);
        CurveAnimation::keyframes(
            vec![
                CurveValue::Bool(true),
                CurveValue::Bool(false),
                CurveValue::Bool(true),
            ],
            vec![shown_at.min(0.0), shown_at, hidden_at],
            CalculationMode::Discrete,
            Vec::new(),
            self.animation_duration(),
            self.timing(),
        )
    }

    fn provided_animation(
        &self,
        property: &str,
        provider: &ValueProvider,
        expected_kind: Option<&'static str>,
    ) -> Option<CurveAnimation> {
        let animation = match provider {
            ValueProvider::Fixed(value) => self.fixed_animation(value.clone()),
            ValueProvider::PerFrame(_) => {
                let first = self.start_frame().min(self.end_frame()).floor() as i64;
                let last = self.start_frame().max(self.end_frame()).ceil() as i64;
                let frames: Vec<f32> = (first..=last).map(|frame| frame as f32).collect();
                let values: Vec<CurveValue> =
                    frames.iter().map(|&frame| provider.value_at(frame)).collect();
                let key_times = frames.iter().map(|&frame| self.progress_time(frame)).collect();
                let timing_functions = vec![TimingFunction::LINEAR; values.len().saturating_sub(1)];
                CurveAnimation::keyframes(
                    values,
                    key_times,
                    CalculationMode::Linear,
                    timing_functions,
                    self.animation_duration(),
                    self.timing(),
                )
            }
        };

        let provided_kind = animation.values().first().map(|value| value.kind());
        match (expected_kind, provided_kind) {
            (Some(expected), Some(provided)) if expected != provided => {
                tracing::warn!(
                    keypath = %self.property_keypath(property),
                    expected,
                    provided,
                    "value provider type does not match the property; ignoring it"
                );
                None
            }
            _ => Some(animation),
        }
    }

    fn keyframe_animation<T>(
        &self,
        property: &str,
        keyframes: &[Keyframe<T>],
        convert: &impl Fn(&T) -> CurveValue,
    ) -> Result<Option<CurveAnimation>, SetupError> {
        let keypath = self.property_keypath(property);
        self.compatibility_tracker().assert(
            !keyframes.iter().any(Keyframe::has_spatial_tangents),
            &keypath,
            "spatial tangents are approximated with straight motion paths",
        )?;

        // Legacy files omit `s` on the final keyframe and carry it as the previous `e`.
        let mut entries = Vec::with_capacity(keyframes.len());
        let mut previous_end: Option<CurveValue> = None;
        for keyframe in keyframes {
            let start = keyframe.s.as_ref().map(convert).or_else(|| previous_end.take());
            previous_end = keyframe.e.as_ref().map(convert);
            let Some(value) = start else {
                continue;
            };
            entries.push(KeyframeEntry {
                frame: keyframe.t,
                value,
                hold: keyframe.is_hold(),
                easing: easing(keyframe),
            });
        }

        match entries.as_slice() {
            [] => return Ok(None),
            [only] => return Ok(Some(self.fixed_animation(only.value.clone()))),
            _ => {}
        }

        let all_hold = entries[..entries.len() - 1].iter().all(|entry| entry.hold);
        let animation = if all_hold {
            CurveAnimation::keyframes(
                entries.iter().map(|entry| entry.value.clone()).collect(),
                entries.iter().map(|entry| self.progress_time(entry.frame)).collect(),
                CalculationMode::Discrete,
                Vec::new(),
                self.animation_duration(),
                self.timing(),
            )
        } else {
            // Hold segments become a flat segment followed by a zero-length jump.
            let mut values = Vec::with_capacity(entries.len() * 2);
            let mut key_times = Vec::with_capacity(entries.len() * 2);
            let mut timing_functions = Vec::with_capacity(entries.len() * 2);
            for (index, entry) in entries.iter().enumerate() {
                values.push(entry.value.clone());
                key_times.push(self.progress_time(entry.frame));
                let Some(next) = entries.get(index + 1) else {
                    continue;
                };
                if entry.hold {
                    timing_functions.push(TimingFunction::LINEAR);
                    values.push(entry.value.clone());
                    key_times.push(self.progress_time(next.frame));
                    timing_functions.push(TimingFunction::LINEAR);
                } else {
                    timing_functions.push(entry.easing);
                }
            }
            CurveAnimation::keyframes(
                values,
                key_times,
                CalculationMode::Linear,
                timing_functions,
                self.animation_duration(),
                self.timing(),
            )
        };
        Ok(Some(animation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::LottieAsset;
    use crate::compatibility::{CompatibilityMode, CompatibilityTracker};
    use crate::curve::CurveKind;
    use crate::text::DefaultTextProvider;
    use crate::value_provider::ValueProviderStore;
    use serde_json::json;

    fn asset() -> LottieAsset {
        LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 10, "ip": 0, "op": 100, "w": 100, "h": 100, "layers": []
            }))
            .unwrap(),
        )
    }

    fn opacity(json: serde_json::Value) -> Property<f32> {
        serde_json::from_value(json).unwrap()
    }

    fn percent(v: &f32) -> CurveValue {
        CurveValue::Scalar(*v / 100.0)
    }

    #[test]
    fn key_times_follow_the_time_remapping() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .with_simple_time_remapping(20.0, 2.0);

        let prop = opacity(json!({ "a": 1, "k": [
            { "t": 0, "s": [0] },
            { "t": 10, "s": [100] }
        ]}));
        let curve = context
            .property_animation("Opacity", &prop, percent)
            .unwrap()
            .unwrap();

        assert_eq!(curve.key_times(), [0.2, 0.4]);
        assert_eq!(curve.duration, 10.0);
        assert_eq!(curve.sample(0.3), Some(CurveValue::Scalar(0.5)));
    }

    #[test]
    fn hold_keyframes_produce_discrete_or_jump_segments() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        let all_hold = opacity(json!({ "a": 1, "k": [
            { "t": 0, "s": [0], "h": 1 },
            { "t": 50, "s": [100] }
        ]}));
        let curve = context
            .property_animation("Opacity", &all_hold, percent)
            .unwrap()
            .unwrap();
        assert!(matches!(
            curve.kind,
            CurveKind::Keyframes { calculation_mode: CalculationMode::Discrete, .. }
        ));

        let mixed = opacity(json!({ "a": 1, "k": [
            { "t": 0, "s": [0], "h": 1 },
            { "t": 50, "s": [100] },
            { "t": 100, "s": [0] }
        ]}));
        let curve = context
            .property_animation("Opacity", &mixed, percent)
            .unwrap()
            .unwrap();
        assert_eq!(curve.key_times(), [0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.sample(0.49), Some(CurveValue::Scalar(0.0)));
        assert_eq!(curve.sample(0.75), Some(CurveValue::Scalar(0.5)));
    }

    #[test]
    fn legacy_end_values_fill_missing_start_values() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        let prop = opacity(json!({ "a": 1, "k": [
            { "t": 0, "s": [0], "e": [100] },
            { "t": 100 }
        ]}));
        let curve = context
            .property_animation("Opacity", &prop, percent)
            .unwrap()
            .unwrap();
        assert_eq!(
            curve.values(),
            vec![&CurveValue::Scalar(0.0), &CurveValue::Scalar(1.0)]
        );
    }

    #[test]
    fn value_providers_replace_keyframes() {
        let asset = asset();
        let mut store = ValueProviderStore::default();
        store.set_value_provider("Layer.Opacity", CurveValue::Scalar(0.25));
        store.set_value_provider("Layer.Rotation", CurveValue::Bool(true));
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .adding_keypath_component("Layer");

        let prop = opacity(json!({ "a": 1, "k": [
            { "t": 0, "s": [0] },
            { "t": 100, "s": [100] }
        ]}));
        let overridden = context
            .property_animation("Opacity", &prop, percent)
            .unwrap()
            .unwrap();
        assert!(overridden.is_static());
        assert_eq!(overridden.sample(0.5), Some(CurveValue::Scalar(0.25)));

        // Mismatched provider types fall back to the keyframes.
        let rotation = context
            .property_animation("Rotation", &prop, percent)
            .unwrap()
            .unwrap();
        assert!(!rotation.is_static());
    }

    #[test]
    fn per_frame_providers_are_sampled_over_the_window() {
        let asset = asset();
        let mut store = ValueProviderStore::default();
        store.set_value_provider(
            "**.Opacity",
            ValueProvider::per_frame(|frame| CurveValue::Scalar(frame / 100.0)),
        );
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .with_frame_window(0.0, 10.0)
            .adding_keypath_component("Layer");

        let curve = context
            .property_animation("Opacity", &Property::fixed(100.0), percent)
            .unwrap()
            .unwrap();
        assert_eq!(curve.values().len(), 11);
        assert_eq!(curve.key_times()[10], 0.1);
    }

    #[test]
    fn expressions_are_soft_incompatibilities() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let prop = opacity(json!({ "a": 0, "k": 50, "x": "wiggle(1, 2)" }));

        let tracker = CompatibilityTracker::new(CompatibilityMode::Track);
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);
        let curve = context.property_animation("Opacity", &prop, percent).unwrap();
        assert!(curve.is_some());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.issues()[0].keypath.full_path(), "Opacity");

        let strict = CompatibilityTracker::new(CompatibilityMode::Abort);
        let context = LayerAnimationContext::new(&asset, &store, &strict, &DefaultTextProvider);
        assert!(matches!(
            context.property_animation("Opacity", &prop, percent),
            Err(SetupError::Incompatible(_))
        ));
    }
}
