use super::BaseLayer;
use crate::backing::StagedAnimations;
use crate::context::LayerAnimationContext;
use crate::curve::CurveValue;
use crate::error::SetupError;
use lottie_data::model::TextDocument;

#[derive(Debug)]
pub struct TextLayer {
    pub(crate) base: BaseLayer,
}

impl TextLayer {
    pub(crate) fn new(base: BaseLayer) -> Self {
        Self { base }
    }

    /// Base properties plus a `string` curve; every document goes through
    /// the context's text provider, keyed by the layer keypath.
    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedAnimations, SetupError> {
        let mut staged = self.base.stage(context)?;
        let Some(text) = &self.base.model().t else {
            return Ok(staged);
        };

        let provider = context.text_provider();
        let keypath = context.keypath();
        let resolve = |document: &TextDocument| {
            CurveValue::Text(
                provider
                    .text_for(keypath, &document.t)
                    .unwrap_or_else(|| document.t.clone()),
            )
        };
        staged.insert_opt("string", context.property_animation("Text", &text.d, resolve)?);
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::LottieAsset;
    use crate::compatibility::CompatibilityTracker;
    use crate::text::DictionaryTextProvider;
    use crate::value_provider::ValueProviderStore;
    use serde_json::json;

    #[test]
    fn text_goes_through_the_provider() {
        let asset = LottieAsset::from_model(
            serde_json::from_value(json!({
                "v": "5.7.0", "fr": 30, "ip": 0, "op": 60, "w": 100, "h": 100, "layers": []
            }))
            .unwrap(),
        );
        let layer = serde_json::from_value(json!({
            "ty": 5, "nm": "Title", "op": 60,
            "t": { "d": { "k": [{ "t": 0, "s": { "t": "Hello", "f": "Roboto", "s": 24 } }] } }
        }))
        .unwrap();
        let text_layer = TextLayer::new(BaseLayer::new(&layer, "Title".into()));

        let store = ValueProviderStore::default();
        let tracker = CompatibilityTracker::default();
        let mut provider = DictionaryTextProvider::default();
        provider.insert("Title", "Bonjour");
        let context = LayerAnimationContext::new(&asset, &store, &tracker, &provider)
            .adding_keypath_component("Title");

        let staged = text_layer.stage(&context).unwrap();
        assert_eq!(
            staged.get("string").and_then(|c| c.sample(0.0)),
            Some(CurveValue::Text("Bonjour".into()))
        );
    }
}
