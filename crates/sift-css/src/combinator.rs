//! Turning the previous step's matches into contexts for the next compound.
//!
//! [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)

use std::collections::HashSet;

use sift_dom::{ElementTree, NodeId};

use crate::context::{Depth, MatchContext};
use crate::selector::Combinator;

/// The contexts in which the compound following `combinator` is evaluated.
///
/// `previous` holds the nodes the preceding compound matched, and `scope` is
/// the node the whole query started from.
///
/// - no combinator, or a group: the scope node with [`Depth::Any`]
/// - descendant: each previous node with [`Depth::Descendants`]
/// - child: each previous node with [`Depth::Exact`]`(1)`
/// - next sibling: the following sibling of each previous node, at depth 0
/// - subsequent sibling: every later sibling of each previous node, at depth 0
///
/// Nodes without a parent have no siblings and contribute no sibling
/// contexts. Duplicate contexts are dropped, keeping first-seen order.
pub fn contexts<T: ElementTree + ?Sized>(
    tree: &T,
    scope: NodeId,
    combinator: Option<Combinator>,
    previous: &[NodeId],
) -> Vec<MatchContext> {
    let mut contexts = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |context: MatchContext| {
        if seen.insert(context) {
            contexts.push(context);
        }
    };

    match combinator {
        None | Some(Combinator::Group) => push(MatchContext::new(scope, Depth::Any)),
        Some(Combinator::Descendant) => {
            for &node in previous {
                push(MatchContext::new(node, Depth::Descendants));
            }
        }
        Some(Combinator::Child) => {
            for &node in previous {
                push(MatchContext::new(node, Depth::Exact(1)));
            }
        }
        Some(Combinator::NextSibling) => {
            for &node in previous {
                if let Some(next) = following_siblings(tree, node).first() {
                    push(MatchContext::new(*next, Depth::Exact(0)));
                }
            }
        }
        Some(Combinator::SubsequentSibling) => {
            for &node in previous {
                for &sibling in following_siblings(tree, node) {
                    push(MatchContext::new(sibling, Depth::Exact(0)));
                }
            }
        }
    }

    contexts
}

/// The siblings after `node` in its parent's children, nearest first.
pub(crate) fn following_siblings<T: ElementTree + ?Sized>(tree: &T, node: NodeId) -> &[NodeId] {
    let Some(parent) = tree.parent(node) else {
        return &[];
    };
    let siblings = tree.children(parent);
    match tree.index_in_parent(node) {
        Some(index) => &siblings[index + 1..],
        None => &[],
    }
}

/// The siblings before `node` in its parent's children, in document order.
pub(crate) fn preceding_siblings<T: ElementTree + ?Sized>(tree: &T, node: NodeId) -> &[NodeId] {
    let Some(parent) = tree.parent(node) else {
        return &[];
    };
    let siblings = tree.children(parent);
    match tree.index_in_parent(node) {
        Some(index) => &siblings[..index],
        None => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_dom::{DomTree, ElementData};

    fn siblings() -> (DomTree, Vec<NodeId>) {
        let mut tree = DomTree::new(ElementData::new("ul"));
        let items = (0..4)
            .map(|_| {
                tree.append_element(NodeId::ROOT, ElementData::new("li"))
                    .unwrap()
            })
            .collect();
        (tree, items)
    }

    fn nodes(contexts: &[MatchContext]) -> Vec<NodeId> {
        contexts.iter().map(|c| c.node).collect()
    }

    #[test]
    fn test_first_compound_and_group_use_scope() {
        let (tree, items) = siblings();
        for combinator in [None, Some(Combinator::Group)] {
            let found = contexts(&tree, NodeId::ROOT, combinator, &items);
            assert_eq!(found, [MatchContext::new(NodeId::ROOT, Depth::Any)]);
        }
    }

    #[test]
    fn test_descendant_and_child_contexts() {
        let (tree, items) = siblings();
        let descendant = contexts(&tree, NodeId::ROOT, Some(Combinator::Descendant), &items[..2]);
        assert_eq!(nodes(&descendant), &items[..2]);
        assert!(descendant.iter().all(|c| c.depth == Depth::Descendants));

        let child = contexts(&tree, NodeId::ROOT, Some(Combinator::Child), &[NodeId::ROOT]);
        assert_eq!(child, [MatchContext::new(NodeId::ROOT, Depth::Exact(1))]);
    }

    #[test]
    fn test_sibling_contexts() {
        let (tree, items) = siblings();
        let next = contexts(&tree, NodeId::ROOT, Some(Combinator::NextSibling), &items);
        assert_eq!(nodes(&next), &items[1..]);

        // Overlapping runs of later siblings are deduplicated.
        let later = contexts(
            &tree,
            NodeId::ROOT,
            Some(Combinator::SubsequentSibling),
            &[items[0], items[1]],
        );
        assert_eq!(nodes(&later), &items[1..]);
        assert!(later.iter().all(|c| c.depth == Depth::Exact(0)));

        let from_root = contexts(&tree, NodeId::ROOT, Some(Combinator::NextSibling), &[NodeId::ROOT]);
        assert!(from_root.is_empty());
    }

    #[test]
    fn test_sibling_slices() {
        let (tree, items) = siblings();
        assert_eq!(following_siblings(&tree, items[1]), &items[2..]);
        assert_eq!(preceding_siblings(&tree, items[1]), &items[..1]);
        assert!(following_siblings(&tree, NodeId::ROOT).is_empty());
    }
}
