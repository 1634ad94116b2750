use crate::curve::CurveAnimation;

/// The native layer primitive animations are attached to.
///
/// Implemented by the platform compositor; [`LayerBacking`] is the in-process
/// implementation every layer variant owns.
pub trait NativeLayer {
    /// Attaches `animation` under `key`, replacing any animation already there.
    fn add_animation(&mut self, key: &str, animation: CurveAnimation);

    fn remove_all_animations(&mut self);

    fn animation(&self, key: &str) -> Option<&CurveAnimation>;

    /// Replaces every attached animation with the staged set in one step.
    fn commit(&mut self, staged: StagedAnimations) {
        self.remove_all_animations();
        for (key, animation) in staged.entries {
            self.add_animation(&key, animation);
        }
    }
}

/// Animations built during a setup call that are not yet visible on a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedAnimations {
    entries: Vec<(String, CurveAnimation)>,
}

impl StagedAnimations {
    pub fn insert(&mut self, key: impl Into<String>, animation: CurveAnimation) {
        let key = key.into();
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, animation));
    }

    /// Inserts `animation` when the property produced one.
    pub fn insert_opt(&mut self, key: impl Into<String>, animation: Option<CurveAnimation>) {
        if let Some(animation) = animation {
            self.insert(key, animation);
        }
    }

    pub fn get(&self, key: &str) -> Option<&CurveAnimation> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, animation)| animation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerBacking {
    animations: Vec<(String, CurveAnimation)>,
}

impl LayerBacking {
    pub fn animation_keys(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl NativeLayer for LayerBacking {
    fn add_animation(&mut self, key: &str, animation: CurveAnimation) {
        match self.animations.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = animation,
            None => self.animations.push((key.to_string(), animation)),
        }
    }

    fn remove_all_animations(&mut self) {
        self.animations.clear();
    }

    fn animation(&self, key: &str) -> Option<&CurveAnimation> {
        self.animations
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, animation)| animation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveValue;
    use crate::timing::TimingConfiguration;

    fn curve(value: f32) -> CurveAnimation {
        CurveAnimation::fixed(CurveValue::Scalar(value), 1.0, TimingConfiguration::default())
    }

    #[test]
    fn commit_replaces_previous_animations() {
        let mut backing = LayerBacking::default();
        backing.add_animation("opacity", curve(0.5));
        backing.add_animation("stale", curve(1.0));

        let mut staged = StagedAnimations::default();
        staged.insert("opacity", curve(1.0));
        staged.insert_opt("transform.rotation", None);
        backing.commit(staged);

        assert_eq!(backing.len(), 1);
        assert!(backing.animation("stale").is_none());
        assert_eq!(backing.animation("opacity"), Some(&curve(1.0)));
    }

    #[test]
    fn later_inserts_win() {
        let mut staged = StagedAnimations::default();
        staged.insert("opacity", curve(0.0));
        staged.insert("opacity", curve(1.0));
        assert_eq!(staged.len(), 1);
        assert_eq!(staged.get("opacity"), Some(&curve(1.0)));
    }
}
