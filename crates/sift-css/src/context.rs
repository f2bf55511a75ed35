//! Evaluating one compound selector against one scope node.
//!
//! A [`MatchContext`] pairs a scope node with a [`Depth`] constraint. Each
//! predicate of the compound walks the constrained subtree on its own, and
//! the compound matches the nodes every walk found.

use std::collections::HashSet;

use sift_common::warning::warn_once;
use sift_dom::{ElementTree, NodeId};

use crate::node_set::NodeSet;
use crate::query::query;
use crate::selector::{CompoundSelector, NthArgument, PseudoClass, PseudoClassKind};

/// Which levels below the scope node a context covers.
///
/// Level 0 is the scope node itself, level 1 its children, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// The scope node and its whole subtree.
    Any,
    /// The subtree without the scope node.
    Descendants,
    /// Exactly this many levels below the scope node.
    Exact(usize),
}

impl Depth {
    /// Whether nodes at `level` are part of the context.
    #[must_use]
    pub const fn admits(self, level: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Descendants => level > 0,
            Self::Exact(depth) => level == depth,
        }
    }

    /// Whether children of a node at `level` can still be part of the context.
    const fn descends_past(self, level: usize) -> bool {
        match self {
            Self::Any | Self::Descendants => true,
            Self::Exact(depth) => level < depth,
        }
    }
}

/// A scope node plus the depth constraint a compound is evaluated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchContext {
    /// The node depths are measured from.
    pub node: NodeId,
    /// Which levels below `node` are considered.
    pub depth: Depth,
}

/// How an `:nth-*` family member picks positions.
#[derive(Debug, Clone, Copy)]
struct NthRule {
    argument: NthArgument,
    /// Count from the last sibling instead of the first.
    from_end: bool,
    /// Count only siblings with the same tag.
    of_type: bool,
    /// Require exactly one qualifying sibling.
    only: bool,
}

impl MatchContext {
    /// A context rooted at `node`.
    #[must_use]
    pub const fn new(node: NodeId, depth: Depth) -> Self {
        Self { node, depth }
    }

    /// All nodes the context covers, in document order.
    pub fn nodes<T: ElementTree + ?Sized>(&self, tree: &T) -> Vec<NodeId> {
        self.select(tree, |_| true)
    }

    /// Depth-first walk of the context, keeping nodes that satisfy `predicate`.
    fn select<T, F>(&self, tree: &T, mut predicate: F) -> Vec<NodeId>
    where
        T: ElementTree + ?Sized,
        F: FnMut(NodeId) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![(self.node, 0usize)];
        while let Some((id, level)) = stack.pop() {
            if self.depth.admits(level) && predicate(id) {
                found.push(id);
            }
            if self.depth.descends_past(level) {
                stack.extend(tree.children(id).iter().rev().map(|&child| (child, level + 1)));
            }
        }
        found
    }

    /// Evaluate `compound` in this context.
    ///
    /// Every predicate present in the compound (universal, id, each class,
    /// tag, attribute clause, pseudo-class) yields its own candidate list;
    /// the result is their intersection in document order. A compound with
    /// no predicate matches nothing.
    pub fn evaluate<'a, T: ElementTree + ?Sized>(
        &self,
        tree: &'a T,
        compound: &CompoundSelector,
    ) -> NodeSet<'a, T> {
        let mut candidates: Vec<Vec<NodeId>> = Vec::new();

        if compound.universal {
            candidates.push(self.nodes(tree));
        }

        // [§ 6.7 ID selectors](https://www.w3.org/TR/selectors-4/#id-selectors)
        if let Some(id) = &compound.id {
            candidates.push(self.select(tree, |n| {
                tree.attribute(n, "id")
                    .is_some_and(|value| value.eq_ignore_ascii_case(id))
            }));
        }

        // [§ 6.6 Class selectors](https://www.w3.org/TR/selectors-4/#class-html)
        for class in &compound.classes {
            candidates.push(self.select(tree, |n| {
                tree.attribute(n, "class").is_some_and(|value| {
                    value
                        .split_ascii_whitespace()
                        .any(|name| name.eq_ignore_ascii_case(class))
                })
            }));
        }

        // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
        if let Some(tag) = &compound.tag {
            candidates.push(self.select(tree, |n| tree.tag_name(n).eq_ignore_ascii_case(tag)));
        }

        if let Some(attribute) = &compound.attribute {
            candidates.push(self.select(tree, |n| {
                attribute.matches(tree.attribute(n, &attribute.name))
            }));
        }

        if let Some(pseudo_class) = &compound.pseudo_class {
            candidates.push(self.pseudo_class(tree, compound, pseudo_class));
        }

        let mut lists = candidates.into_iter();
        let Some(first) = lists.next() else {
            return NodeSet::new(tree);
        };
        let mut matched = NodeSet::from_nodes(tree, first);
        for list in lists {
            matched = matched.intersection(&NodeSet::from_nodes(tree, list));
        }
        matched
    }

    /// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    fn pseudo_class<T: ElementTree + ?Sized>(
        &self,
        tree: &T,
        compound: &CompoundSelector,
        pseudo_class: &PseudoClass,
    ) -> Vec<NodeId> {
        let Some(kind) = pseudo_class.kind() else {
            let _ = warn_once(
                "selector",
                &format!("unsupported pseudo-class ':{}'", pseudo_class.name),
            );
            return Vec::new();
        };

        let argument = pseudo_class.argument.as_deref().unwrap_or_default();
        let rule = |argument, from_end, of_type, only| NthRule {
            argument,
            from_end,
            of_type,
            only,
        };
        let nth = |from_end, of_type| {
            let parsed = NthArgument::parse(argument);
            if parsed.is_none() {
                tracing::debug!(argument, pseudo_class = %kind, "unusable nth argument");
            }
            parsed.map(|argument| rule(argument, from_end, of_type, false))
        };

        let nth_rule = match kind {
            // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
            PseudoClassKind::Root => {
                return self.select(tree, |n| tree.parent(n).is_none());
            }
            // [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
            PseudoClassKind::Empty => {
                return self.select(tree, |n| {
                    tree.children(n).is_empty() && tree.text(n).is_empty()
                });
            }
            // [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
            PseudoClassKind::Not => {
                let excluded = if argument.is_empty() {
                    HashSet::new()
                } else {
                    query(tree, self.node, argument).iter().collect()
                };
                return self.select(tree, |n| !excluded.contains(&n));
            }
            PseudoClassKind::FirstChild => Some(rule(NthArgument::FIRST, false, false, false)),
            PseudoClassKind::LastChild => Some(rule(NthArgument::FIRST, true, false, false)),
            PseudoClassKind::OnlyChild => Some(rule(NthArgument::FIRST, false, false, true)),
            PseudoClassKind::NthChild => nth(false, false),
            PseudoClassKind::NthLastChild => nth(true, false),
            PseudoClassKind::FirstOfType => Some(rule(NthArgument::FIRST, false, true, false)),
            PseudoClassKind::LastOfType => Some(rule(NthArgument::FIRST, true, true, false)),
            PseudoClassKind::OnlyOfType => Some(rule(NthArgument::FIRST, false, true, true)),
            PseudoClassKind::NthOfType => nth(false, true),
            PseudoClassKind::NthLastOfType => nth(true, true),
        };

        nth_rule.map_or_else(Vec::new, |rule| self.nth_position(tree, compound, rule))
    }

    /// The shared algorithm behind every `:nth-*`, `:first-*`, `:last-*` and
    /// `:only-*` pseudo-class.
    ///
    /// Candidates are the context nodes matching the compound's tag (all
    /// context nodes when it has none). For each distinct parent, the rule's
    /// positions are turned into child indexes among the qualifying siblings:
    /// `p - 1` counting forward, `count - p` counting from the end.
    fn nth_position<T: ElementTree + ?Sized>(
        &self,
        tree: &T,
        compound: &CompoundSelector,
        rule: NthRule,
    ) -> Vec<NodeId> {
        let tag = compound.tag.as_deref();
        let candidates = self.select(tree, |n| {
            tag.is_none_or(|tag| tree.tag_name(n).eq_ignore_ascii_case(tag))
        });

        let mut selected: HashSet<NodeId> = HashSet::new();
        let mut visited: HashSet<(NodeId, Option<String>)> = HashSet::new();

        for &candidate in &candidates {
            let Some(parent) = tree.parent(candidate) else {
                continue;
            };
            let type_name = rule.of_type.then(|| {
                tag.unwrap_or_else(|| tree.tag_name(candidate))
                    .to_ascii_lowercase()
            });
            if !visited.insert((parent, type_name.clone())) {
                continue;
            }

            let siblings: Vec<NodeId> = tree
                .children(parent)
                .iter()
                .copied()
                .filter(|&sibling| {
                    type_name
                        .as_deref()
                        .is_none_or(|name| tree.tag_name(sibling).eq_ignore_ascii_case(name))
                })
                .collect();
            let count = siblings.len();

            let indexes: Vec<usize> = if rule.only {
                if count == 1 { vec![0] } else { Vec::new() }
            } else {
                rule.argument
                    .positions(count)
                    .into_iter()
                    .map(|p| if rule.from_end { count - p } else { p - 1 })
                    .collect()
            };
            selected.extend(indexes.into_iter().map(|index| siblings[index]));
        }

        candidates
            .into_iter()
            .filter(|candidate| selected.contains(candidate))
            .collect()
    }
}
