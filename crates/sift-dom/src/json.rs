//! Build a [`DomTree`] from a JSON document.
//!
//! The expected shape is one object per element:
//!
//! ```json
//! {
//!   "tag": "ul",
//!   "attrs": { "class": "menu", "data-role": "nav" },
//!   "text": "",
//!   "children": [ { "tag": "li", "text": "1" } ]
//! }
//! ```
//!
//! Only `tag` is required. `tagName` and `attributes` are accepted as
//! aliases. Attribute order follows the order of keys in the document.

use std::fmt;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

use crate::{AttributesMap, DomTree, ElementData, NodeId, TreeError};

#[derive(Debug, Deserialize)]
struct JsonElement {
    #[serde(alias = "tagName")]
    tag: String,
    #[serde(default, alias = "attributes")]
    attrs: AttributesMap,
    #[serde(default)]
    text: String,
    #[serde(default)]
    children: Vec<JsonElement>,
}

impl JsonElement {
    fn split(self) -> (ElementData, Vec<Self>) {
        let data = ElementData {
            tag_name: self.tag,
            attrs: self.attrs,
            text: self.text,
        };
        (data, self.children)
    }
}

impl<'de> Deserialize<'de> for AttributesMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = AttributesMap;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of attribute names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut attrs = AttributesMap::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    let _ = attrs.insert(name, value);
                }
                Ok(attrs)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

impl DomTree {
    /// Parse a JSON element document into a tree. The top-level object
    /// becomes the root.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Json`] if the text is not a well-formed element
    /// document.
    pub fn from_json(source: &str) -> Result<Self, TreeError> {
        let root: JsonElement = serde_json::from_str(source)?;
        let (data, children) = root.split();
        let mut tree = Self::new(data);
        tree.append_json_children(NodeId::ROOT, children)?;
        Ok(tree)
    }

    fn append_json_children(
        &mut self,
        parent: NodeId,
        children: Vec<JsonElement>,
    ) -> Result<(), TreeError> {
        for child in children {
            let (data, grandchildren) = child.split();
            let id = self.append_element(parent, data)?;
            self.append_json_children(id, grandchildren)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementTree;

    #[test]
    fn test_from_json_builds_children_in_order() {
        let tree = DomTree::from_json(
            r#"{"tag": "ul", "children": [
                {"tag": "li", "text": "1"},
                {"tag": "li", "text": "2", "attrs": {"class": "last"}}
            ]}"#,
        )
        .unwrap();

        let items = tree.children(tree.root()).to_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(ElementTree::text(&tree, items[0]), "1");
        assert_eq!(tree.attribute(items[1], "CLASS"), Some("last"));
        assert_eq!(tree.parent(items[1]), Some(NodeId::ROOT));
    }

    #[test]
    fn test_from_json_preserves_attribute_order() {
        let tree = DomTree::from_json(
            r#"{"tagName": "a", "attributes": {"z": "1", "a": "2", "m": "3"}}"#,
        )
        .unwrap();

        let names: Vec<&str> = tree.attributes(NodeId::ROOT).map(|(k, _)| k).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_from_json_rejects_missing_tag() {
        let err = DomTree::from_json(r#"{"text": "orphan"}"#).unwrap_err();
        assert!(matches!(err, TreeError::Json(_)));
    }
}
