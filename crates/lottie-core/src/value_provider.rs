//! User supplied overrides for animatable properties, matched by keypath.

use crate::curve::CurveValue;
use crate::keypath::AnimationKeypath;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum ValueProvider {
    /// The same value at every frame.
    Fixed(CurveValue),
    /// Evaluated once per frame of the active window when curves are built.
    PerFrame(Rc<dyn Fn(f32) -> CurveValue>),
}

impl ValueProvider {
    pub fn per_frame(f: impl Fn(f32) -> CurveValue + 'static) -> Self {
        ValueProvider::PerFrame(Rc::new(f))
    }

    pub fn value_at(&self, frame: f32) -> CurveValue {
        match self {
            ValueProvider::Fixed(value) => value.clone(),
            ValueProvider::PerFrame(f) => f(frame),
        }
    }
}

impl fmt::Debug for ValueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProvider::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            ValueProvider::PerFrame(_) => f.write_str("PerFrame(..)"),
        }
    }
}

impl From<CurveValue> for ValueProvider {
    fn from(value: CurveValue) -> Self {
        ValueProvider::Fixed(value)
    }
}

/// Read-only during a setup pass; the most recent registration for a
/// matching keypath wins.
#[derive(Debug, Clone, Default)]
pub struct ValueProviderStore {
    providers: Vec<(AnimationKeypath, ValueProvider)>,
}

impl ValueProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value_provider(
        &mut self,
        keypath: impl Into<AnimationKeypath>,
        provider: impl Into<ValueProvider>,
    ) {
        let keypath = keypath.into();
        self.providers.retain(|(existing, _)| *existing != keypath);
        self.providers.push((keypath, provider.into()));
    }

    pub fn value_for(&self, keypath: &AnimationKeypath) -> Option<&ValueProvider> {
        self.providers
            .iter()
            .rev()
            .find(|(pattern, _)| pattern.matches(keypath))
            .map(|(_, provider)| provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
