//! The selector engine entry points.

use sift_dom::{ElementTree, NodeId};

use crate::combinator::contexts;
use crate::node_set::NodeSet;
#[cfg(feature = "query-trace")]
use crate::selector::Combinator;
use crate::selector::parse_selector;

/// Find every node under `scope` that `selector` matches.
///
/// Compounds are evaluated left to right. Each combinator turns the previous
/// compound's matches into the contexts the next compound is evaluated in,
/// starting from the scope node itself, so a leading combinator such as
/// `"> li"` is relative to `scope`. A comma closes the current selector: its
/// matches join the result and evaluation restarts from the scope, so
/// `"> li, > span"` selects the scope's `li` and `span` children.
///
/// The scope node itself can match the first compound. The result is
/// deduplicated; within each comma-separated part, nodes are in the order
/// their contexts produced them.
///
/// An empty selector matches nothing.
///
/// # Example
/// ```
/// use sift_css::query;
/// use sift_dom::{DomTree, ElementData, NodeId};
///
/// let mut tree = DomTree::new(ElementData::new("ul"));
/// let item = tree.append_element(NodeId::ROOT, ElementData::new("li")).unwrap();
///
/// assert_eq!(query(&tree, NodeId::ROOT, "ul > li").nodes(), [item]);
/// ```
pub fn query<'a, T: ElementTree + ?Sized>(
    tree: &'a T,
    scope: NodeId,
    selector: &str,
) -> NodeSet<'a, T> {
    let Some(compounds) = parse_selector(selector) else {
        tracing::debug!(selector, %scope, "empty selector");
        return NodeSet::new(tree);
    };

    let seed = NodeSet::from_nodes(tree, [scope]);
    let mut current = seed.clone();
    let mut matched = NodeSet::new(tree);

    for compound in &compounds {
        if compound.starts_group {
            matched.merge(&current);
            current = seed.clone();
        }

        let step_contexts = contexts(tree, scope, compound.combinator, current.nodes());
        #[cfg(feature = "query-trace")]
        tracing::trace!(
            combinator = ?compound.combinator.map(Combinator::sign),
            ?compound,
            contexts = step_contexts.len(),
            "compound"
        );

        let mut step = NodeSet::new(tree);
        for context in step_contexts {
            let found = context.evaluate(tree, compound);
            #[cfg(feature = "query-trace")]
            tracing::trace!(?context, found = found.count(), "context");
            step.merge(&found);
        }
        current = step;
    }
    matched.merge(&current);

    tracing::debug!(selector, %scope, matched = matched.count(), "query");
    matched
}

/// The first node `query` would return, if any.
#[must_use]
pub fn query_first<T: ElementTree + ?Sized>(tree: &T, scope: NodeId, selector: &str) -> Option<NodeId> {
    query(tree, scope, selector).get(0)
}
