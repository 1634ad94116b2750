use super::{build_layers, BaseLayer, BuildStack, CompositionLayer, StagedLayer};
use crate::asset::LottieAsset;
use crate::context::LayerAnimationContext;
use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Resolved,
    Missing,
    /// The asset contains a layer that references the asset itself.
    Cyclic,
}

/// Embeds the layers of a precomposition asset, offset by the layer's start
/// time and stretched by its time stretch.
#[derive(Debug)]
pub struct PreCompositionLayer {
    pub(crate) base: BaseLayer,
    ref_id: String,
    source: Source,
    children: Vec<CompositionLayer>,
}

impl PreCompositionLayer {
    pub(crate) fn build(base: BaseLayer, asset: &LottieAsset, visiting: &mut BuildStack) -> Self {
        let ref_id = base.model().ref_id.clone().unwrap_or_default();
        let (source, children) = if visiting.contains(&ref_id) {
            (Source::Cyclic, Vec::new())
        } else {
            match asset.precomposition(&ref_id) {
                Some(layers) => {
                    visiting.push(ref_id.clone());
                    let children = build_layers(layers, asset, visiting);
                    visiting.pop();
                    (Source::Resolved, children)
                }
                None => (Source::Missing, Vec::new()),
            }
        };

        Self {
            base,
            ref_id,
            source,
            children,
        }
    }

    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }

    pub fn children(&self) -> &[CompositionLayer] {
        &self.children
    }

    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedLayer, SetupError> {
        let animations = self.base.stage(context)?;
        match self.source {
            Source::Resolved => {}
            Source::Missing => {
                return Err(SetupError::MissingAsset {
                    keypath: context.keypath().clone(),
                    ref_id: self.ref_id.clone(),
                })
            }
            Source::Cyclic => {
                return Err(SetupError::InvalidAsset(format!(
                    "precomposition `{}` contains itself (at `{}`)",
                    self.ref_id,
                    context.keypath()
                )))
            }
        }

        let model = self.base.model();
        context.assert_compatible(
            model.tm.is_none(),
            "time remap keyframes are approximated by the layer start time and stretch",
        )?;

        let child_context = context.with_simple_time_remapping(model.st, model.sr);
        let children = self
            .children
            .iter()
            .map(|child| child.stage(&child_context))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StagedLayer {
            animations,
            children,
        })
    }

    pub(crate) fn commit_children(&mut self, staged: Vec<StagedLayer>) {
        for (child, staged) in self.children.iter_mut().zip(staged) {
            child.commit(staged);
        }
    }

    pub(crate) fn clear_children(&mut self) {
        for child in &mut self.children {
            child.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::NativeLayer;
    use crate::compatibility::CompatibilityTracker;
    use crate::layers::AnimationLayer;
    use crate::text::DefaultTextProvider;
    use crate::value_provider::ValueProviderStore;
    use serde_json::json;

    fn asset() -> LottieAsset {
        LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 10, "ip": 0, "op": 100, "w": 100, "h": 100,
                "layers": [
                    { "ty": 0, "nm": "Comp", "refId": "comp_0", "st": 20, "sr": 2, "op": 100 },
                    { "ty": 0, "nm": "Loop", "refId": "comp_loop", "op": 100 }
                ],
                "assets": [
                    {
                        "id": "comp_0",
                        "layers": [{
                            "ty": 3, "nm": "Inner", "op": 40,
                            "ks": { "o": { "a": 1, "k": [{ "t": 0, "s": [0] }, { "t": 10, "s": [100] }] } }
                        }]
                    },
                    {
                        "id": "comp_loop",
                        "layers": [{ "ty": 0, "nm": "Again", "refId": "comp_loop", "op": 100 }]
                    }
                ]
            }))
            .unwrap(),
        )
    }

    #[test]
    fn children_are_remapped_by_start_time_and_stretch() {
        let asset = asset();
        let mut layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        layers[0].setup_animations(&context).unwrap();

        let inner = layers[0].find("Inner").unwrap();
        let opacity = inner.backing().animation("opacity").unwrap();
        assert_eq!(opacity.key_times(), [0.2, 0.4]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn self_referencing_precompositions_fail() {
        let asset = asset();
        let mut layers = CompositionLayer::build_all(&asset.model.layers, &asset);
        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &DefaultTextProvider);

        assert_eq!(layers[1].sublayers().len(), 1);
        assert!(matches!(
            layers[1].setup_animations(&context),
            Err(SetupError::InvalidAsset(_))
        ));
        assert!(layers[1].backing().is_empty());
    }
}
