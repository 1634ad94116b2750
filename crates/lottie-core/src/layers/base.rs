use crate::backing::{LayerBacking, StagedAnimations};
use crate::context::LayerAnimationContext;
use crate::curve::CurveValue;
use crate::error::SetupError;
use glam::{Vec2, Vec4};
use lottie_data::model::{self as data, PositionProperty, Vec3DefaultZero, Vec3Scale};

// Lottie units to backend units.

pub(crate) fn point(v: &data::Vec2) -> CurveValue {
    CurveValue::Point(Vec2::from(*v))
}

pub(crate) fn point3(v: &Vec3DefaultZero) -> CurveValue {
    CurveValue::Point(Vec2::new(v.0[0], v.0[1]))
}

pub(crate) fn scale(v: &Vec3Scale) -> CurveValue {
    CurveValue::Point(Vec2::new(v.0[0] / 100.0, v.0[1] / 100.0))
}

pub(crate) fn rotation(degrees: &f32) -> CurveValue {
    CurveValue::Scalar(degrees.to_radians())
}

pub(crate) fn opacity(percent: &f32) -> CurveValue {
    CurveValue::Scalar(*percent / 100.0)
}

pub(crate) fn scalar(v: &f32) -> CurveValue {
    CurveValue::Scalar(*v)
}

pub(crate) fn color(c: &data::Vec4) -> CurveValue {
    CurveValue::Color(Vec4::from(*c))
}

/// Stages the `Transform` group of a layer or shape group.
pub(crate) fn stage_transform(
    context: &LayerAnimationContext<'_>,
    transform: &data::Transform,
    staged: &mut StagedAnimations,
) -> Result<(), SetupError> {
    let context = context.adding_keypath_component("Transform");

    staged.insert_opt(
        "transform.anchorPoint",
        context.property_animation("Anchor Point", &transform.a, point3)?,
    );
    match &transform.p {
        PositionProperty::Unified(position) => staged.insert_opt(
            "transform.position",
            context.property_animation("Position", position, point3)?,
        ),
        PositionProperty::Split { x, y, .. } => {
            staged.insert_opt(
                "transform.position.x",
                context.property_animation("X Position", x, scalar)?,
            );
            staged.insert_opt(
                "transform.position.y",
                context.property_animation("Y Position", y, scalar)?,
            );
        }
    }
    staged.insert_opt(
        "transform.scale",
        context.property_animation("Scale", &transform.s, scale)?,
    );
    staged.insert_opt(
        "transform.rotation",
        context.property_animation("Rotation", &transform.rz, rotation)?,
    );
    staged.insert_opt(
        "opacity",
        context.property_animation("Opacity", &transform.o, opacity)?,
    );
    Ok(())
}

/// State shared by every layer variant: its name, source model and backing.
#[derive(Debug)]
pub struct BaseLayer {
    name: String,
    model: data::Layer,
    pub(crate) backing: LayerBacking,
}

impl BaseLayer {
    pub(crate) fn new(model: &data::Layer, name: String) -> Self {
        Self {
            name,
            model: model.clone(),
            backing: LayerBacking::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &data::Layer {
        &self.model
    }

    pub fn backing(&self) -> &LayerBacking {
        &self.backing
    }

    /// Transform, opacity and visibility curves. `context` already ends with
    /// this layer's name.
    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedAnimations, SetupError> {
        if self.model.ddd == Some(1) {
            return Err(context.unsupported("3D layer"));
        }

        let mut staged = StagedAnimations::default();
        stage_transform(context, &self.model.ks, &mut staged)?;
        staged.insert(
            "isHidden",
            context.visibility_animation(self.model.ip, self.model.op),
        );
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::LottieAsset;
    use crate::compatibility::CompatibilityTracker;
    use crate::text::DefaultTextProvider;
    use crate::value_provider::ValueProviderStore;
    use serde_json::json;

    fn asset() -> LottieAsset {
        LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 30, "ip": 0, "op": 60, "w": 100, "h": 100, "layers": []
            }))
            .unwrap(),
        )
    }

    fn layer(json: serde_json::Value) -> data::Layer {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn stages_transform_and_visibility() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .adding_keypath_component("Null 1");

        let base = BaseLayer::new(
            &layer(json!({
                "ty": 3, "nm": "Null 1", "ip": 15, "op": 45,
                "ks": {
                    "p": { "a": 0, "k": [50, 25, 0] },
                    "s": { "a": 0, "k": [200, 50, 100] },
                    "r": { "a": 0, "k": 180 },
                    "o": { "a": 1, "k": [{ "t": 0, "s": [0] }, { "t": 30, "s": [100] }] }
                }
            })),
            "Null 1".into(),
        );
        let staged = base.stage(&context).unwrap();

        assert_eq!(
            staged.get("transform.position").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Point(Vec2::new(50.0, 25.0)))
        );
        assert_eq!(
            staged.get("transform.scale").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Point(Vec2::new(2.0, 0.5)))
        );
        assert_eq!(
            staged.get("transform.rotation").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Scalar(180f32.to_radians()))
        );
        assert_eq!(staged.get("opacity").map(|c| c.key_times()), Some(&[0.0, 0.5][..]));
        assert!(staged.get("transform.anchorPoint").is_none());

        let visibility = staged.get("isHidden").unwrap();
        assert_eq!(visibility.sample(0.1).and_then(|v| v.as_bool()), Some(true));
        assert_eq!(visibility.sample(0.5).and_then(|v| v.as_bool()), Some(false));
        assert_eq!(visibility.sample(0.75).and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn layer_starting_with_the_composition_is_visible_on_its_first_frame() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .adding_keypath_component("Null 1");

        let base = BaseLayer::new(
            &layer(json!({ "ty": 3, "nm": "Null 1", "ip": 0, "op": 60 })),
            "Null 1".into(),
        );
        let staged = base.stage(&context).unwrap();

        let visibility = staged.get("isHidden").unwrap();
        assert_eq!(visibility.key_times(), [0.0, 0.0, 1.0]);
        assert_eq!(visibility.sample(0.0).and_then(|v| v.as_bool()), Some(false));
        assert_eq!(visibility.sample(0.99).and_then(|v| v.as_bool()), Some(false));
        assert_eq!(visibility.sample(1.0).and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn split_position_uses_per_axis_keys() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let recorded = std::cell::RefCell::new(Vec::new());
        let record = |keypath: &crate::keypath::AnimationKeypath| {
            recorded.borrow_mut().push(keypath.full_path())
        };
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .with_keypath_recorder(&record)
            .adding_keypath_component("Layer");

        let base = BaseLayer::new(
            &layer(json!({
                "ty": 3, "ip": 0, "op": 60,
                "ks": { "p": { "s": true, "x": { "a": 0, "k": 10 }, "y": { "a": 0, "k": 20 } } }
            })),
            "Layer".into(),
        );
        let staged = base.stage(&context).unwrap();

        assert_eq!(
            staged.get("transform.position.x").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Scalar(10.0))
        );
        assert_eq!(
            staged.get("transform.position.y").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Scalar(20.0))
        );
        assert!(recorded
            .borrow()
            .contains(&"Layer.Transform.X Position".to_string()));
    }

    #[test]
    fn three_d_layers_are_unsupported() {
        let asset = asset();
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider)
            .adding_keypath_component("Card");

        let base = BaseLayer::new(&layer(json!({ "ty": 4, "ddd": 1, "op": 60 })), "Card".into());
        assert!(matches!(
            base.stage(&context),
            Err(SetupError::Unsupported { feature, .. }) if feature == "3D layer"
        ));
    }
}
