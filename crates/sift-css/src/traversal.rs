//! jQuery-style traversal over node sets.
//!
//! Every method takes an optional selector filter. A node passes a filter
//! when querying the filter from the top of the node's tree matches that
//! node, so filters see the whole tree, not just the node's subtree. Each
//! operation computes the filter once per tree root it meets.

use std::collections::{HashMap, HashSet};

use sift_dom::{Ancestors, ElementTree, NodeId};

use crate::combinator::{following_siblings, preceding_siblings};
use crate::node_set::NodeSet;
use crate::query::query;

/// A selector filter with its matches cached per tree root.
struct Filter<'a, 's, T: ElementTree + ?Sized> {
    tree: &'a T,
    selector: Option<&'s str>,
    matches: HashMap<NodeId, HashSet<NodeId>>,
}

impl<'a, 's, T: ElementTree + ?Sized> Filter<'a, 's, T> {
    fn new(tree: &'a T, selector: Option<&'s str>) -> Self {
        Self {
            tree,
            selector,
            matches: HashMap::new(),
        }
    }

    /// Whether `id` is selected. A missing selector selects nothing.
    fn selects(&mut self, id: NodeId) -> bool {
        let Some(selector) = self.selector else {
            return false;
        };
        let tree = self.tree;
        let top = tree.top(id);
        self.matches
            .entry(top)
            .or_insert_with(|| query(tree, top, selector).iter().collect())
            .contains(&id)
    }

    /// Whether `id` passes. A missing selector lets everything through.
    fn admits(&mut self, id: NodeId) -> bool {
        self.selector.is_none() || self.selects(id)
    }
}

impl<'a, T: ElementTree + ?Sized> NodeSet<'a, T> {
    fn collect_filtered<I>(&self, filter: Option<&str>, nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut filter = Filter::new(self.tree(), filter);
        Self::from_nodes(
            self.tree(),
            nodes.into_iter().filter(|&id| filter.admits(id)),
        )
    }

    /// The direct parent of each member, optionally filtered.
    ///
    /// Members without a parent contribute nothing.
    #[must_use]
    pub fn parent(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(filter, self.iter().filter_map(|id| tree.parent(id)))
    }

    /// Every ancestor of each member, nearest first, optionally filtered.
    #[must_use]
    pub fn parents(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(filter, self.iter().flat_map(|id| Ancestors::new(tree, id)))
    }

    /// Ancestors of each member up to but not including the first one
    /// matching `stop`, optionally filtered. With no `stop`, all ancestors.
    #[must_use]
    pub fn parents_until(&self, stop: Option<&str>, filter: Option<&str>) -> Self {
        let tree = self.tree();
        let mut stop = Filter::new(tree, stop);
        let mut walked = Vec::new();
        for id in self.iter() {
            walked.extend(Ancestors::new(tree, id).take_while(|&ancestor| !stop.selects(ancestor)));
        }
        self.collect_filtered(filter, walked)
    }

    /// For each member, the member itself or its nearest ancestor matching
    /// `selector`. With no selector the set is returned unchanged.
    #[must_use]
    pub fn closest(&self, selector: Option<&str>) -> Self {
        if selector.is_none() {
            return self.clone();
        }
        let tree = self.tree();
        let mut filter = Filter::new(tree, selector);
        let found: Vec<NodeId> = self
            .iter()
            .filter_map(|id| {
                std::iter::once(id)
                    .chain(Ancestors::new(tree, id))
                    .find(|&candidate| filter.selects(candidate))
            })
            .collect();
        Self::from_nodes(tree, found)
    }

    /// The children of each member, optionally filtered.
    #[must_use]
    pub fn children(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(
            filter,
            self.iter().flat_map(|id| tree.children(id).iter().copied()),
        )
    }

    /// Descendants of the members that match `selector`.
    ///
    /// The selector is queried from each child of each member, so a member
    /// itself is never part of the result.
    #[must_use]
    pub fn find(&self, selector: &str) -> Self {
        let tree = self.tree();
        let mut found = Self::new(tree);
        for id in self.iter() {
            for &child in tree.children(id) {
                found.merge(&query(tree, child, selector));
            }
        }
        found
    }

    /// The other children of each member's parent, optionally filtered.
    #[must_use]
    pub fn siblings(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        let siblings = self.iter().flat_map(|id| {
            let parent_children = tree.parent(id).map_or(&[][..], |parent| tree.children(parent));
            parent_children.iter().copied().filter(move |&sibling| sibling != id)
        });
        self.collect_filtered(filter, siblings)
    }

    /// The sibling immediately after each member, optionally filtered.
    #[must_use]
    pub fn next(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(
            filter,
            self.iter()
                .filter_map(|id| following_siblings(tree, id).first().copied()),
        )
    }

    /// The sibling immediately before each member, optionally filtered.
    #[must_use]
    pub fn prev(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(
            filter,
            self.iter()
                .filter_map(|id| preceding_siblings(tree, id).last().copied()),
        )
    }

    /// Every sibling after each member, optionally filtered.
    #[must_use]
    pub fn next_all(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(
            filter,
            self.iter()
                .flat_map(|id| following_siblings(tree, id).iter().copied()),
        )
    }

    /// Every sibling before each member, nearest first, optionally filtered.
    #[must_use]
    pub fn prev_all(&self, filter: Option<&str>) -> Self {
        let tree = self.tree();
        self.collect_filtered(
            filter,
            self.iter()
                .flat_map(|id| preceding_siblings(tree, id).iter().rev().copied()),
        )
    }

    /// Siblings after each member up to but not including the first one
    /// matching `stop`, optionally filtered. With no `stop`, all later
    /// siblings.
    #[must_use]
    pub fn next_until(&self, stop: Option<&str>, filter: Option<&str>) -> Self {
        let tree = self.tree();
        let mut stop = Filter::new(tree, stop);
        let mut walked = Vec::new();
        for id in self.iter() {
            walked.extend(
                following_siblings(tree, id)
                    .iter()
                    .copied()
                    .take_while(|&sibling| !stop.selects(sibling)),
            );
        }
        self.collect_filtered(filter, walked)
    }

    /// Siblings before each member, nearest first, up to but not including
    /// the first one matching `stop`, optionally filtered. With no `stop`,
    /// all earlier siblings.
    #[must_use]
    pub fn prev_until(&self, stop: Option<&str>, filter: Option<&str>) -> Self {
        let tree = self.tree();
        let mut stop = Filter::new(tree, stop);
        let mut walked = Vec::new();
        for id in self.iter() {
            walked.extend(
                preceding_siblings(tree, id)
                    .iter()
                    .rev()
                    .copied()
                    .take_while(|&sibling| !stop.selects(sibling)),
            );
        }
        self.collect_filtered(filter, walked)
    }

    /// Descendants of the members that do not match `selector`.
    ///
    /// Equivalent to `find(":not(selector)")`.
    #[must_use]
    pub fn not(&self, selector: &str) -> Self {
        self.find(&format!(":not({selector})"))
    }

    /// The members that match `selector`.
    #[must_use]
    pub fn filter(&self, selector: &str) -> Self {
        self.collect_filtered(Some(selector), self.iter())
    }
}
