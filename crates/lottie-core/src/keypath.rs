//! Keypaths identify a node or property in the layer hierarchy.
//!
//! The external string form joins segments with `.`, e.g.
//! `"Layer 1.Shape 1.Fill 1.Color"`. Lookup patterns registered with the
//! [`ValueProviderStore`](crate::ValueProviderStore) may use `*` to match a
//! single segment and `**` to match any number of segments.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Matches exactly one segment in a lookup pattern.
pub const WILDCARD: &str = "*";
/// Matches zero or more segments in a lookup pattern.
pub const FUZZY_WILDCARD: &str = "**";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationKeypath {
    keys: Vec<String>,
}

impl AnimationKeypath {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dot-separated keypath. An empty string yields the empty keypath.
    pub fn parse(keypath: &str) -> Self {
        if keypath.is_empty() {
            return Self::default();
        }
        Self::new(keypath.split('.'))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    /// Returns a new keypath with `key` appended; `self` is left untouched.
    pub fn appending(&self, key: impl Into<String>) -> Self {
        let mut keys = Vec::with_capacity(self.keys.len() + 1);
        keys.extend(self.keys.iter().cloned());
        keys.push(key.into());
        Self { keys }
    }

    pub fn full_path(&self) -> String {
        self.keys.join(".")
    }

    pub fn has_wildcards(&self) -> bool {
        self.keys
            .iter()
            .any(|key| key == WILDCARD || key == FUZZY_WILDCARD)
    }

    /// Treats `self` as a lookup pattern and tests it against a concrete keypath.
    pub fn matches(&self, keypath: &AnimationKeypath) -> bool {
        matches_keys(&self.keys, &keypath.keys)
    }
}

fn matches_keys(pattern: &[String], keys: &[String]) -> bool {
    match pattern.split_first() {
        None => keys.is_empty(),
        Some((head, rest)) if head == FUZZY_WILDCARD => {
            (0..=keys.len()).any(|skip| matches_keys(rest, &keys[skip..]))
        }
        Some((head, rest)) => match keys.split_first() {
            Some((key, remaining)) => {
                (head == WILDCARD || head == key) && matches_keys(rest, remaining)
            }
            None => false,
        },
    }
}

impl fmt::Display for AnimationKeypath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl FromStr for AnimationKeypath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for AnimationKeypath {
    fn from(keypath: &str) -> Self {
        Self::parse(keypath)
    }
}

impl Serialize for AnimationKeypath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
