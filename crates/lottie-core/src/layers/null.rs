use super::BaseLayer;
use crate::backing::StagedAnimations;
use crate::context::LayerAnimationContext;
use crate::error::SetupError;

/// Transform-only layer, usually a parenting handle.
#[derive(Debug)]
pub struct NullLayer {
    pub(crate) base: BaseLayer,
}

impl NullLayer {
    pub(crate) fn new(base: BaseLayer) -> Self {
        Self { base }
    }

    pub(crate) fn stage(
        &self,
        context: &LayerAnimationContext<'_>,
    ) -> Result<StagedAnimations, SetupError> {
        self.base.stage(context)
    }
}
