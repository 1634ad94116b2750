use super::BaseLayer;
use crate::asset::{ImageSource, LottieAsset};
use crate::backing::StagedAnimations;
use crate::context::LayerAnimationContext;
use crate::error::SetupError;

#[derive(Debug)]
pub struct ImageLayer {
    pub(crate) base: BaseLayer,
    image: Option<ImageSource>,
}

impl ImageLayer {
    pub(crate) fn new(base: BaseLayer, asset: &LottieAsset) -> Self {
        let image = base
            .model()
            .ref_id
            .as_deref()
            .and_then(|ref_id| asset.image(ref_id))
            .cloned();
        Self { base, image }
    }

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    /// A missing or undecodable image leaves the layer blank but animated.
    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedAnimations, SetupError> {
        let staged = self.base.stage(context)?;
        let ref_id = self.base.model().ref_id.as_deref().unwrap_or_default();
        match &self.image {
            None => context.assert_compatible(false, format!("image asset `{ref_id}` is missing"))?,
            Some(ImageSource::Malformed) => context.assert_compatible(
                false,
                format!("image asset `{ref_id}` could not be decoded"),
            )?,
            Some(_) => {}
        }
        Ok(staged)
    }
}
