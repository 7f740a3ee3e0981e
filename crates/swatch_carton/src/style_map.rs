//! The compiled mapping from semantic to emitted class names.

use compact_str::CompactString;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

/// Insertion-ordered map using the Fx hasher.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Mapping from semantic class name to emitted class name for one stylesheet.
///
/// Keys keep declaration order so serialized maps are byte-identical across
/// builds of unchanged input. A `StyleMap` has no mutating API; it is built
/// once by the compiler (or collected from pairs) and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap {
    entries: FxIndexMap<CompactString, CompactString>,
}

impl StyleMap {
    /// An empty map (a stylesheet declaring no local names).
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the emitted name for a semantic name. Case-sensitive.
    #[inline]
    pub fn get(&self, semantic: &str) -> Option<&str> {
        self.entries.get(semantic).map(CompactString::as_str)
    }

    #[inline]
    pub fn contains(&self, semantic: &str) -> bool {
        self.entries.contains_key(semantic)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(semantic, emitted)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Semantic names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(CompactString::as_str)
    }

    /// Serialize as a JSON object.
    pub fn to_json(&self) -> String {
        // A map of strings to strings cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a JSON object of semantic to emitted names.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<FxIndexMap<CompactString, CompactString>> for StyleMap {
    fn from(entries: FxIndexMap<CompactString, CompactString>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<CompactString>,
    V: Into<CompactString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StyleMap {
        [("button", "a1B2c"), ("title", "zZ_9-")].into_iter().collect()
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let styles = sample();
        assert_eq!(styles.get("button"), Some("a1B2c"));
        assert_eq!(styles.get("Button"), None);
        assert!(styles.contains("title"));
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn test_json_keeps_declaration_order() {
        let styles: StyleMap = [("zeta", "z"), ("alpha", "a")].into_iter().collect();
        assert_eq!(styles.to_json(), r#"{"zeta":"z","alpha":"a"}"#);
        let parsed = StyleMap::from_json(&styles.to_json()).unwrap();
        assert_eq!(parsed, styles);
        assert_eq!(parsed.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }
}
