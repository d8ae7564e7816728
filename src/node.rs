//! Game tree nodes.
//!
//! A [`GameNode`] is one position of a game record: a bag of SGF properties,
//! an ordered list of variations (the first child is the main line) and a set
//! of out-of-band tags. The same type is used for trees parsed from SGF text
//! and for the single-branch chains produced by [`crate::split`].
//!
//! The JSON form is `{ "data": { "B": ["pd"] }, "children": [...], "tags": [...] }`.
//! Property values may arrive as a bare string or a list; both normalize to a list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::constants::{
    DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, PROP_BLACK, PROP_COMMENT, PROP_KOMI, PROP_SIZE,
    PROP_WHITE,
};

/// Property identifier to its ordered values.
pub type Properties = BTreeMap<String, Vec<String>>;

/// A node of a game tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameNode {
    #[serde(rename = "data", default, deserialize_with = "de_properties")]
    pub properties: Properties,
    #[serde(default)]
    pub children: Vec<GameNode>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

pub(crate) fn de_properties<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Properties, D::Error> {
    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| match value {
            OneOrMany::One(s) => (key, vec![s]),
            OneOrMany::Many(v) => (key, v),
        })
        .collect())
}

impl GameNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property setter.
    pub fn with_property<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(key, values);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: GameNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style tag insertion.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn set<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties
            .insert(key.to_string(), values.into_iter().map(Into::into).collect());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.properties.get(key).map(Vec::as_slice)
    }

    /// First value of a property.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }

    pub fn black_move(&self) -> Option<&str> {
        self.first(PROP_BLACK)
    }

    pub fn white_move(&self) -> Option<&str> {
        self.first(PROP_WHITE)
    }

    /// The node's comment, multiple values joined by newlines.
    pub fn comment(&self) -> Option<String> {
        self.get(PROP_COMMENT).map(|values| values.join("\n"))
    }

    /// Declared board size (`SZ[19]` or `SZ[19:19]`).
    ///
    /// Missing or unusable sizes fall back to [`DEFAULT_BOARD_SIZE`].
    pub fn board_size(&self) -> usize {
        let Some(raw) = self.first(PROP_SIZE) else {
            return DEFAULT_BOARD_SIZE;
        };
        let width = raw.split(':').next().unwrap_or_default().trim();
        match width.parse::<usize>() {
            Ok(size) if (1..=MAX_BOARD_SIZE).contains(&size) => size,
            _ => {
                warn!(size = raw, "unsupported board size, using {DEFAULT_BOARD_SIZE}");
                DEFAULT_BOARD_SIZE
            }
        }
    }

    pub fn komi(&self) -> Option<f32> {
        self.first(PROP_KOMI)?.trim().parse().ok()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of leaves in the subtree rooted at this node.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.children.is_empty() {
                count += 1;
            }
            stack.extend(node.children.iter());
        }
        count
    }

    /// Copy of this node's properties and tags without its children.
    pub fn minimal_clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            children: Vec::new(),
            tags: self.tags.clone(),
        }
    }
}

// Deep main lines would otherwise recurse once per move on drop.
impl Drop for GameNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_joins_values() {
        let node = GameNode::new().with_property("C", ["first", "second"]);
        assert_eq!(node.comment().as_deref(), Some("first\nsecond"));
        assert_eq!(GameNode::new().comment(), None);
    }

    #[test]
    fn test_board_size() {
        assert_eq!(GameNode::new().board_size(), 19);
        assert_eq!(GameNode::new().with_property("SZ", ["9"]).board_size(), 9);
        assert_eq!(GameNode::new().with_property("SZ", ["13:13"]).board_size(), 13);
        assert_eq!(GameNode::new().with_property("SZ", ["52"]).board_size(), 19);
        assert_eq!(GameNode::new().with_property("SZ", ["x"]).board_size(), 19);
    }

    #[test]
    fn test_komi() {
        assert_eq!(GameNode::new().with_property("KM", ["6.5"]).komi(), Some(6.5));
        assert_eq!(GameNode::new().komi(), None);
    }

    #[test]
    fn test_leaf_count() {
        let tree = GameNode::new().with_child(
            GameNode::new()
                .with_child(GameNode::new())
                .with_child(GameNode::new().with_child(GameNode::new())),
        );
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(GameNode::new().leaf_count(), 1);
    }

    #[test]
    fn test_minimal_clone_drops_children() {
        let node = GameNode::new()
            .with_property("B", ["aa"])
            .with_tag("joseki")
            .with_child(GameNode::new());
        let clone = node.minimal_clone();
        assert!(clone.children.is_empty());
        assert_eq!(clone.black_move(), Some("aa"));
        assert!(clone.tags.contains("joseki"));
    }

    #[test]
    fn test_json_accepts_scalar_and_list_values() {
        let json = r#"{"data":{"C":"hello","B":["pd"]},"children":[{"data":{"W":"dd"}}]}"#;
        let node: GameNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.get("C"), Some(&["hello".to_string()][..]));
        assert_eq!(node.black_move(), Some("pd"));
        assert_eq!(node.children[0].white_move(), Some("dd"));
        assert!(node.children[0].tags.is_empty());
    }

    #[test]
    fn test_json_omits_empty_tags() {
        let node = GameNode::new().with_property("B", ["aa"]);
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"data":{"B":["aa"]},"children":[]}"#);
    }

    #[test]
    fn test_drop_deep_chain() {
        let mut node = GameNode::new();
        for _ in 0..100_000 {
            node = GameNode::new().with_child(node);
        }
        drop(node);
    }
}
