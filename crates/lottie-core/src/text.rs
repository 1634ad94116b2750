use crate::keypath::AnimationKeypath;
use std::collections::HashMap;

/// Supplies replacement strings for text layers.
pub trait TextProvider {
    /// Returns the text to display for the layer at `keypath`, or `None` to keep
    /// `source_text` from the animation.
    fn text_for(&self, keypath: &AnimationKeypath, source_text: &str) -> Option<String>;
}

/// Keeps every text layer as authored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTextProvider;

impl TextProvider for DefaultTextProvider {
    fn text_for(&self, _keypath: &AnimationKeypath, _source_text: &str) -> Option<String> {
        None
    }
}

/// Looks replacements up by full keypath first, then by the source text.
#[derive(Debug, Clone, Default)]
pub struct DictionaryTextProvider {
    values: HashMap<String, String>,
}

impl DictionaryTextProvider {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.values.insert(key.into(), text.into());
    }
}

impl TextProvider for DictionaryTextProvider {
    fn text_for(&self, keypath: &AnimationKeypath, source_text: &str) -> Option<String> {
        self.values
            .get(&keypath.full_path())
            .or_else(|| self.values.get(source_text))
            .cloned()
    }
}
