//! The closed set of animatable layer variants.
//!
//! [`CompositionLayer::build_all`] turns the asset's layer list into a tree;
//! [`AnimationLayer::setup_animations`] then walks it with a
//! [`LayerAnimationContext`]. Each call first stages every curve of the
//! subtree and only attaches them once the whole subtree succeeded.

mod base;
mod image;
mod null;
mod precomp;
mod shape;
mod solid;
mod text;

pub use base::BaseLayer;
pub use image::ImageLayer;
pub use null::NullLayer;
pub use precomp::PreCompositionLayer;
pub use shape::{ShapeGroupLayer, ShapeLayer};
pub use solid::SolidLayer;
pub use text::TextLayer;

use crate::asset::LottieAsset;
use crate::backing::{LayerBacking, NativeLayer, StagedAnimations};
use crate::context::LayerAnimationContext;
use crate::error::SetupError;
use lottie_data::model as data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSupport {
    Animated,
    /// Non-visual layers (audio, data) never enter the tree.
    Skipped,
    /// Cannot be represented at all; setup fails.
    Unsupported(&'static str),
    /// Unknown type; recorded as an incompatibility and left empty.
    Unknown,
}

pub fn layer_type_support(ty: u8) -> LayerSupport {
    match ty {
        0..=5 => LayerSupport::Animated,
        6 | 15 => LayerSupport::Skipped,
        13 => LayerSupport::Unsupported("camera layer"),
        _ => LayerSupport::Unknown,
    }
}

/// Builds and attaches the native animations of one layer and its children.
pub trait AnimationLayer {
    /// `context` is scoped to the layer's parent; the layer appends its own
    /// name to the keypath. Nothing is attached when an error is returned,
    /// and compatibility issues recorded by the failed call are discarded.
    fn setup_animations(&mut self, context: &LayerAnimationContext<'_>) -> Result<(), SetupError>;
}

/// Curves built for one node and its children, not yet attached.
#[derive(Debug, Default)]
pub(crate) struct StagedLayer {
    pub(crate) animations: StagedAnimations,
    pub(crate) children: Vec<StagedLayer>,
}

impl StagedLayer {
    pub(crate) fn leaf(animations: StagedAnimations) -> Self {
        Self {
            animations,
            children: Vec::new(),
        }
    }
}

/// A layer type the backend cannot draw.
#[derive(Debug)]
pub struct UnsupportedLayer {
    base: BaseLayer,
    feature: String,
    fatal: bool,
}

impl UnsupportedLayer {
    pub fn feature(&self) -> &str {
        &self.feature
    }

    fn stage(&self, context: &LayerAnimationContext<'_>) -> Result<StagedLayer, SetupError> {
        if self.fatal {
            return Err(context.unsupported(self.feature.as_str()));
        }
        context.assert_compatible(
            false,
            format!("{} is not supported; the layer is left empty", self.feature),
        )?;
        Ok(StagedLayer::default())
    }
}

#[derive(Debug)]
pub enum CompositionLayer {
    PreComposition(PreCompositionLayer),
    Solid(SolidLayer),
    Image(ImageLayer),
    Null(NullLayer),
    Shape(ShapeLayer),
    Text(TextLayer),
    Unsupported(UnsupportedLayer),
}

impl CompositionLayer {
    /// Builds the tree for `layers`, in file order.
    pub fn build_all(layers: &[data::Layer], asset: &LottieAsset) -> Vec<CompositionLayer> {
        let mut visiting = Vec::new();
        build_layers(layers, asset, &mut visiting)
    }

    pub fn base(&self) -> &BaseLayer {
        match self {
            CompositionLayer::PreComposition(layer) => &layer.base,
            CompositionLayer::Solid(layer) => &layer.base,
            CompositionLayer::Image(layer) => &layer.base,
            CompositionLayer::Null(layer) => &layer.base,
            CompositionLayer::Shape(layer) => &layer.base,
            CompositionLayer::Text(layer) => &layer.base,
            CompositionLayer::Unsupported(layer) => &layer.base,
        }
    }

    fn base_mut(&mut self) -> &mut BaseLayer {
        match self {
            CompositionLayer::PreComposition(layer) => &mut layer.base,
            CompositionLayer::Solid(layer) => &mut layer.base,
            CompositionLayer::Image(layer) => &mut layer.base,
            CompositionLayer::Null(layer) => &mut layer.base,
            CompositionLayer::Shape(layer) => &mut layer.base,
            CompositionLayer::Text(layer) => &mut layer.base,
            CompositionLayer::Unsupported(layer) => &mut layer.base,
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn backing(&self) -> &LayerBacking {
        self.base().backing()
    }

    /// Child layers of a precomposition; empty for every other variant.
    pub fn sublayers(&self) -> &[CompositionLayer] {
        match self {
            CompositionLayer::PreComposition(layer) => layer.children(),
            _ => &[],
        }
    }

    /// Depth-first search by layer name.
    pub fn find(&self, name: &str) -> Option<&CompositionLayer> {
        if self.name() == name {
            return Some(self);
        }
        self.sublayers().iter().find_map(|child| child.find(name))
    }

    pub(crate) fn stage(
        &self,
        parent_context: &LayerAnimationContext<'_>,
    ) -> Result<StagedLayer, SetupError> {
        let context = parent_context.adding_keypath_component(self.name());
        let _span = tracing::debug_span!("layer", keypath = %context.keypath()).entered();
        tracing::debug!(ty = self.base().model().ty, "setting up layer animations");

        match self {
            CompositionLayer::PreComposition(layer) => layer.stage(&context),
            CompositionLayer::Solid(layer) => layer.stage(&context).map(StagedLayer::leaf),
            CompositionLayer::Image(layer) => layer.stage(&context).map(StagedLayer::leaf),
            CompositionLayer::Null(layer) => layer.stage(&context).map(StagedLayer::leaf),
            CompositionLayer::Shape(layer) => layer.stage(&context),
            CompositionLayer::Text(layer) => layer.stage(&context).map(StagedLayer::leaf),
            CompositionLayer::Unsupported(layer) => layer.stage(&context),
        }
    }

    pub(crate) fn commit(&mut self, staged: StagedLayer) {
        self.base_mut().backing.commit(staged.animations);
        match self {
            CompositionLayer::PreComposition(layer) => layer.commit_children(staged.children),
            CompositionLayer::Shape(layer) => layer.commit_groups(staged.children),
            _ => {}
        }
    }

    pub(crate) fn clear(&mut self) {
        self.base_mut().backing.remove_all_animations();
        match self {
            CompositionLayer::PreComposition(layer) => layer.clear_children(),
            CompositionLayer::Shape(layer) => layer.clear_groups(),
            _ => {}
        }
    }
}

impl AnimationLayer for CompositionLayer {
    fn setup_animations(&mut self, context: &LayerAnimationContext<'_>) -> Result<(), SetupError> {
        let staged = context
            .compatibility_tracker()
            .transaction(|| self.stage(context))?;
        self.commit(staged);
        Ok(())
    }
}

/// Names of the precompositions currently being built, outermost first.
pub(crate) type BuildStack = Vec<String>;

pub(crate) fn build_layers(
    layers: &[data::Layer],
    asset: &LottieAsset,
    visiting: &mut BuildStack,
) -> Vec<CompositionLayer> {
    let mut built = Vec::with_capacity(layers.len());
    for (index, layer) in layers.iter().enumerate() {
        if let Some(layer) = build_layer(index, layer, asset, visiting) {
            built.push(layer);
        }
    }
    built
}

fn build_layer(
    index: usize,
    layer: &data::Layer,
    asset: &LottieAsset,
    visiting: &mut BuildStack,
) -> Option<CompositionLayer> {
    if layer.hd == Some(true) {
        tracing::debug!(name = ?layer.nm, "skipping hidden layer");
        return None;
    }

    let name = layer
        .nm
        .clone()
        .unwrap_or_else(|| format!("Layer {}", layer.ind.map_or(index + 1, |ind| ind as usize)));
    let base = BaseLayer::new(layer, name);

    let built = match layer_type_support(layer.ty) {
        LayerSupport::Skipped => return None,
        LayerSupport::Unsupported(feature) => CompositionLayer::Unsupported(UnsupportedLayer {
            base,
            feature: feature.to_string(),
            fatal: true,
        }),
        LayerSupport::Unknown => CompositionLayer::Unsupported(UnsupportedLayer {
            base,
            feature: format!("layer type {}", layer.ty),
            fatal: false,
        }),
        LayerSupport::Animated => match layer.ty {
            0 => CompositionLayer::PreComposition(PreCompositionLayer::build(base, asset, visiting)),
            1 => CompositionLayer::Solid(SolidLayer::new(base)),
            2 => CompositionLayer::Image(ImageLayer::new(base, asset)),
            3 => CompositionLayer::Null(NullLayer::new(base)),
            4 => CompositionLayer::Shape(ShapeLayer::new(base)),
            _ => CompositionLayer::Text(TextLayer::new(base)),
        },
    };
    Some(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::{CompatibilityMode, CompatibilityTracker};
    use crate::text::DefaultTextProvider;
    use crate::value_provider::ValueProviderStore;
    use serde_json::json;

    fn asset(layers: serde_json::Value) -> LottieAsset {
        LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 30, "ip": 0, "op": 60, "w": 100, "h": 100,
                "layers": layers
            }))
            .unwrap(),
        )
    }

    #[test]
    fn layer_type_support_table() {
        assert_eq!(layer_type_support(4), LayerSupport::Animated);
        assert_eq!(layer_type_support(6), LayerSupport::Skipped);
        assert_eq!(layer_type_support(15), LayerSupport::Skipped);
        assert_eq!(layer_type_support(13), LayerSupport::Unsupported("camera layer"));
        assert_eq!(layer_type_support(42), LayerSupport::Unknown);
    }

    #[test]
    fn tree_skips_hidden_and_non_visual_layers() {
        let asset = asset(json!([
            { "ty": 3, "nm": "Visible", "op": 60 },
            { "ty": 3, "nm": "Hidden", "hd": true, "op": 60 },
            { "ty": 6, "nm": "Audio", "op": 60 },
            { "ty": 3, "ind": 7, "op": 60 }
        ]));
        let layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        let names: Vec<_> = layers.iter().map(CompositionLayer::name).collect();
        assert_eq!(names, ["Visible", "Layer 7"]);
    }

    #[test]
    fn unknown_layers_are_soft_and_cameras_are_hard() {
        let asset = asset(json!([
            { "ty": 42, "nm": "Mystery", "op": 60 },
            { "ty": 13, "nm": "Camera", "op": 60 }
        ]));
        let mut layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::new(CompatibilityMode::Track);
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        layers[0].setup_animations(&context).unwrap();
        assert!(layers[0].backing().is_empty());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.issues()[0].keypath.full_path(), "Mystery");

        let err = layers[1].setup_animations(&context).unwrap_err();
        assert!(matches!(err, SetupError::Unsupported { ref keypath, .. } if keypath.full_path() == "Camera"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn failed_setup_attaches_nothing_and_rolls_back_issues() {
        let asset = asset(json!([
            {
                "ty": 0, "nm": "Comp", "refId": "missing", "op": 60,
                "ks": { "o": { "a": 0, "k": 50, "x": "value" } }
            }
        ]));
        let mut layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        assert!(matches!(
            layers[0].setup_animations(&context),
            Err(SetupError::MissingAsset { ref ref_id, .. }) if ref_id == "missing"
        ));
        assert!(layers[0].backing().is_empty());
        assert!(tracker.is_empty());
    }
}
