//! CSS selector engine and node-set traversal for sift element trees.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector parsing** ([Selectors Level 3](https://www.w3.org/TR/selectors-3/))
//!   - Universal, type, id, class and attribute selectors
//!   - Attribute operators `=`, `~=`, `|=`, `^=`, `$=`, `*=` and the `i` flag
//!   - Descendant, child, next-sibling and subsequent-sibling combinators
//!   - Comma-separated selector lists
//!
//! - **Structural pseudo-classes**
//!   - `:root`, `:empty`, `:not()`
//!   - `:first-child`, `:last-child`, `:only-child`, `:nth-child()`, `:nth-last-child()`
//!   - `:first-of-type`, `:last-of-type`, `:only-of-type`, `:nth-of-type()`, `:nth-last-of-type()`
//!
//! - **Node sets** with union, intersection and difference, text and markup
//!   output, and jQuery-style traversal (`parent`, `parents`, `closest`,
//!   `find`, `siblings`, `next_all`, `slice`, ...)
//!
//! The engine is generic over [`sift_dom::ElementTree`], so any tree that
//! can report tags, attributes, text, children and parents can be queried.
//!
//! # Not Implemented
//!
//! - Dynamic pseudo-classes (`:hover`, `:focus`, ...), which match nothing
//! - Pseudo-elements, which are parsed but never matched
//! - Specificity and cascade
//!
//! # Example
//! ```
//! use sift_css::query;
//! use sift_dom::{DomTree, ElementData, NodeId};
//!
//! let mut tree = DomTree::new(ElementData::new("ul"));
//! for text in ["a", "b", "c"] {
//!     let _ = tree
//!         .append_element(NodeId::ROOT, ElementData::new("li").with_text(text))
//!         .unwrap();
//! }
//!
//! let odd = query(&tree, NodeId::ROOT, "li:nth-child(odd)");
//! assert_eq!(odd.text(true, false), "a c");
//! assert_eq!(odd.parent(None).count(), 1);
//! ```

/// Mapping combinators to matching contexts.
pub mod combinator;
/// Evaluating one compound selector in one context.
pub mod context;
/// Ordered, identity-deduplicated node sets.
pub mod node_set;
/// Query entry points.
pub mod query;
/// Selector parsing per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
mod traversal;

// Re-exports for convenience
pub use context::{Depth, MatchContext};
pub use node_set::NodeSet;
pub use query::{query, query_first};
pub use selector::{
    AttributeOperator, AttributeSelector, Combinator, CompoundSelector, NthArgument, PseudoClass,
    PseudoClassKind, parse_selector,
};
