//! Ordered, identity-deduplicated node collections.
//!
//! A [`NodeSet`] is what every query and traversal returns. It borrows the
//! tree it came from, so a set cannot outlive a mutation of that tree.

use std::collections::{HashMap, HashSet};
use std::fmt;

use sift_dom::{ElementTree, NodeId, to_markup};

/// An ordered set of nodes from one tree.
///
/// Order is the order of first insertion; a node already present is never
/// added twice. Identity is [`NodeId`] equality, never content.
pub struct NodeSet<'a, T: ElementTree + ?Sized> {
    tree: &'a T,
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl<'a, T: ElementTree + ?Sized> NodeSet<'a, T> {
    /// An empty set over `tree`.
    #[must_use]
    pub fn new(tree: &'a T) -> Self {
        Self {
            tree,
            nodes: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// A set holding `nodes` in order, dropping repeats.
    pub fn from_nodes(tree: &'a T, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut set = Self::new(tree);
        set.extend(nodes);
        set
    }

    /// The tree these nodes belong to.
    #[must_use]
    pub const fn tree(&self) -> &'a T {
        self.tree
    }

    /// Members in order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Iterate over members in order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// The member at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Append `id` unless it is already a member. Returns whether it was added.
    pub fn insert(&mut self, id: NodeId) -> bool {
        let added = self.members.insert(id);
        if added {
            self.nodes.push(id);
        }
        added
    }

    /// Append the members of `other` that are not already present.
    pub fn merge(&mut self, other: &NodeSet<'_, T>) {
        self.extend(other.iter());
    }

    /// Members of `self` followed by the members of `other` not in `self`.
    #[must_use]
    pub fn union(&self, other: &NodeSet<'_, T>) -> Self {
        let mut union = self.clone();
        union.merge(other);
        union
    }

    /// Members of `self` that are also in `other`, in `self`'s order.
    #[must_use]
    pub fn intersection(&self, other: &NodeSet<'_, T>) -> Self {
        Self::from_nodes(self.tree, self.iter().filter(|&id| other.contains(id)))
    }

    /// Members of `self` that are not in `other`, in `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &NodeSet<'_, T>) -> Self {
        Self::from_nodes(self.tree, self.iter().filter(|&id| !other.contains(id)))
    }

    /// The members from `start` up to but not including `end`.
    ///
    /// Follows `Array.prototype.slice`: negative indexes count back from the
    /// end, out-of-range indexes are clamped, and `end = None` runs to the
    /// end of the set.
    #[must_use]
    pub fn slice(&self, start: isize, end: Option<isize>) -> Self {
        let len = self.count();
        let from = clamp_index(start, len);
        let to = end.map_or(len, |end| clamp_index(end, len));
        if from >= to {
            return Self::new(self.tree);
        }
        Self::from_nodes(self.tree, self.nodes[from..to].iter().copied())
    }

    /// The first member as a set of at most one.
    #[must_use]
    pub fn first(&self) -> Self {
        self.eq(0)
    }

    /// The last member as a set of at most one.
    #[must_use]
    pub fn last(&self) -> Self {
        self.eq(-1)
    }

    /// The member at `index` (negative counts back from the end) as a set of
    /// at most one.
    #[must_use]
    pub fn eq(&self, index: isize) -> Self {
        let len = self.count();
        let position = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        Self::from_nodes(self.tree, position.and_then(|p| self.get(p)))
    }

    /// The text of every member, joined with single spaces.
    ///
    /// A member's text is its own value followed by, when `recursive`, the
    /// text of its children computed the same way. With `trim`, each own
    /// value is trimmed before joining.
    #[must_use]
    pub fn text(&self, recursive: bool, trim: bool) -> String {
        join_text(self.tree, &self.nodes, recursive, trim)
    }

    /// The concatenated markup of every member, or `None` for an empty set.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.iter().map(|id| to_markup(self.tree, id)).collect())
    }

    /// The markup of each member separately.
    #[must_use]
    pub fn to_xml_list(&self) -> Vec<String> {
        self.iter().map(|id| to_markup(self.tree, id)).collect()
    }

    /// Markup of all members wrapped in a single `tag` element
    /// (`span` when `None`).
    #[must_use]
    pub fn flatten(&self, tag: Option<&str>) -> String {
        let tag = tag.unwrap_or("span");
        match self.html() {
            Some(inner) => format!("<{tag}>{inner}</{tag}>"),
            None => format!("<{tag}/>"),
        }
    }
}

/// Resolve a slice bound against `len`.
fn clamp_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

fn join_text<T: ElementTree + ?Sized>(
    tree: &T,
    nodes: &[NodeId],
    recursive: bool,
    trim: bool,
) -> String {
    nodes
        .iter()
        .map(|&id| node_text(tree, id, recursive, trim))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A node's own text, followed by its children's text when `recursive`.
///
/// Children are folded into their parents bottom-up over an explicit
/// parents-first list, so deep trees do not grow the call stack.
fn node_text<T: ElementTree + ?Sized>(tree: &T, id: NodeId, recursive: bool, trim: bool) -> String {
    let own = move |node: NodeId| {
        let text = tree.text(node);
        if trim { text.trim() } else { text }
    };
    if !recursive {
        return own(id).to_string();
    }

    let mut order = Vec::new();
    let mut stack = vec![id];
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(tree.children(node));
    }

    let mut finished: HashMap<NodeId, String> = HashMap::new();
    for &node in order.iter().rev() {
        let children = tree
            .children(node)
            .iter()
            .map(|child| finished.remove(child).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        let mut text = own(node).to_string();
        if !children.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&children);
        }
        let _ = finished.insert(node, text);
    }
    finished.remove(&id).unwrap_or_default()
}

impl<T: ElementTree + ?Sized> Clone for NodeSet<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            nodes: self.nodes.clone(),
            members: self.members.clone(),
        }
    }
}

impl<T: ElementTree + ?Sized> fmt::Debug for NodeSet<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes).finish()
    }
}

/// Two sets are equal when they hold the same nodes of the same tree in the
/// same order.
impl<T: ElementTree + ?Sized> PartialEq for NodeSet<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.nodes == other.nodes
    }
}

impl<T: ElementTree + ?Sized> Eq for NodeSet<'_, T> {}

impl<T: ElementTree + ?Sized> Extend<NodeId> for NodeSet<'_, T> {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        for id in iter {
            let _ = self.insert(id);
        }
    }
}

impl<'s, T: ElementTree + ?Sized> IntoIterator for &'s NodeSet<'_, T> {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
