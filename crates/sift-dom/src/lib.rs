//! Element tree for the sift selector engine.
//!
//! This crate provides an arena-based tree of element nodes and the
//! [`ElementTree`] capability the selector engine is generic over.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. A
//! [`NodeId`] is also the node's identity: two handles denote the same node
//! exactly when their ids are equal, regardless of content.
//!
//! Nodes removed from the tree stay in the arena, detached, and may be
//! appended again later.

use std::fmt;

use thiserror::Error;

/// JSON tree loader.
pub mod json;
/// Markup serialization and debug printing.
pub mod markup;

pub use markup::{print_tree, to_markup};

/// A type-safe index into the element tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues,
/// and serves as the node's stable identity for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root element is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by tree construction and mutation.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The id does not belong to this tree's arena.
    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    /// The node already has a parent; remove it before appending it elsewhere.
    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    /// The append would make a node its own ancestor.
    #[error("appending {child} under {parent} would create a cycle")]
    Cycle {
        /// The requested parent.
        parent: NodeId,
        /// The node that was to be appended.
        child: NodeId,
    },

    /// The root element is the anchor of the tree and cannot be detached.
    #[error("the root node cannot be removed")]
    RootRemoval,

    /// The JSON document could not be read as an element tree.
    #[error("invalid JSON tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered map of attribute names to values for an element.
///
/// Insertion order is preserved. Name lookups are ASCII case-insensitive,
/// and inserting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributesMap {
    entries: Vec<(String, String)>,
}

impl AttributesMap {
    /// Create an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up an attribute value by (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether an attribute with this (case-insensitive) name is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the element has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributesMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            let _ = attrs.insert(name, value);
        }
        attrs
    }
}

/// Element-specific data.
///
/// An element carries its tag name, its attribute list and the text value
/// directly contained in it. Text is not modelled as separate child nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// The element's tag name as written by the tree builder.
    pub tag_name: String,
    /// Ordered attribute list.
    pub attrs: AttributesMap,
    /// Text value directly contained in the element.
    pub text: String,
}

impl ElementData {
    /// Create an element with the given tag and no attributes or text.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: AttributesMap::new(),
            text: String::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name, value);
        self
    }

    /// Builder-style text setter.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Returns the class names from the class attribute, in attribute order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// A node in the arena: element data plus its tree relationships.
#[derive(Debug, Clone)]
pub struct Node {
    /// The element this node carries.
    pub data: ElementData,

    /// The parent, or `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,

    /// Children in document order. Each child's `parent` points back here.
    pub children: Vec<NodeId>,

    /// The sibling immediately following this node in its parent's children.
    pub next_sibling: Option<NodeId>,

    /// The sibling immediately preceding this node in its parent's children.
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn new(data: ElementData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Arena-based element tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by `NodeId`
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The root element is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree holding just the root element.
    #[must_use]
    pub fn new(root: ElementData) -> Self {
        Self {
            nodes: vec![Node::new(root)],
        }
    }

    /// Get the root element ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get mutable element data for a node.
    ///
    /// Only the element payload is exposed mutably; relationships change
    /// through [`DomTree::append_child`] and [`DomTree::remove`].
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.0).map(|n| &mut n.data)
    }

    /// Get the number of nodes in the arena (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (never true: the root always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: ElementData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocate a node and append it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if `parent` is not in this tree.
    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> Result<NodeId, TreeError> {
        if self.get(parent).is_none() {
            return Err(TreeError::UnknownNode(parent));
        }
        let child = self.alloc(data);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Appends `child` as the last child of `parent`, updating all relationships.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownNode`] if either id is not in this tree.
    /// - [`TreeError::AlreadyAttached`] if `child` already has a parent.
    /// - [`TreeError::Cycle`] if `child` is `parent` or one of its ancestors
    ///   (this includes appending the root anywhere).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.get(parent).is_none() {
            return Err(TreeError::UnknownNode(parent));
        }
        let Some(child_node) = self.get(child) else {
            return Err(TreeError::UnknownNode(child));
        };
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        // A node without children is nobody's ancestor.
        let may_contain_parent = !child_node.children.is_empty();
        if child == parent
            || child == NodeId::ROOT
            || (may_contain_parent && self.is_descendant_of(parent, child))
        {
            return Err(TreeError::Cycle { parent, child });
        }

        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent.
    ///
    /// Removing a node that is already detached is a no-op. The subtree stays
    /// in the arena and can be appended again.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownNode`] if `id` is not in this tree.
    /// - [`TreeError::RootRemoval`] for the root element.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == NodeId::ROOT {
            return Err(TreeError::RootRemoval);
        }
        let Some(node) = self.get(id) else {
            return Err(TreeError::UnknownNode(id));
        };
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let prev = node.prev_sibling;
        let next = node.next_sibling;

        self.nodes[parent.0].children.retain(|&c| c != id);
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        Ok(())
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, Self> {
        Ancestors::new(self, id)
    }

    /// Get element data for a node.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).map(|n| &n.data)
    }
}

/// Read-only capability the selector engine needs from a tree.
///
/// Implementations report unknown ids as empty: no tag, no attributes, no
/// children, no text, no parent. Every child listed by
/// [`ElementTree::children`] must report that node as its
/// [`ElementTree::parent`].
pub trait ElementTree {
    /// Tag name of the element.
    fn tag_name(&self, id: NodeId) -> &str;

    /// Attribute value by ASCII case-insensitive name.
    fn attribute(&self, id: NodeId, name: &str) -> Option<&str>;

    /// All attributes in document order.
    fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)>;

    /// Children in document order.
    fn children(&self, id: NodeId) -> &[NodeId];

    /// Text value directly contained in the element.
    fn text(&self, id: NodeId) -> &str;

    /// Parent of the element, `None` at the root.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Position of the node among its parent's children.
    fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id);
        debug_assert!(
            index.is_some(),
            "node {id} names {parent} as parent but is not among its children"
        );
        index
    }

    /// The topmost ancestor of a node (the node itself when it has no parent).
    fn top(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }
}

impl ElementTree for DomTree {
    fn tag_name(&self, id: NodeId) -> &str {
        self.as_element(id).map_or("", |e| e.tag_name.as_str())
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attrs.get(name))
    }

    fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.as_element(id)
            .into_iter()
            .flat_map(|e| e.attrs.iter())
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        Self::children(self, id)
    }

    fn text(&self, id: NodeId) -> &str {
        self.as_element(id).map_or("", |e| e.text.as_str())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        Self::parent(self, id)
    }
}

/// Iterator over ancestors of a node, nearest first.
pub struct Ancestors<'a, T: ElementTree + ?Sized> {
    tree: &'a T,
    current: Option<NodeId>,
}

impl<'a, T: ElementTree + ?Sized> Ancestors<'a, T> {
    /// Start at the parent of `id`.
    pub fn new(tree: &'a T, id: NodeId) -> Self {
        Self {
            tree,
            current: tree.parent(id),
        }
    }
}

impl<T: ElementTree + ?Sized> Iterator for Ancestors<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
