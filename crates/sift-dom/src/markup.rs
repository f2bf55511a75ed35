//! Minimal markup output: serialization for `html()` and a debug tree dump.

use std::fmt::Write;

use crate::{ElementTree, NodeId};

/// Serialize a node and its subtree as markup.
///
/// Attributes are written in document order with `"`-quoted, escaped values.
/// The node's own text comes before its children. A node with neither text
/// nor children is written as a self-closing tag.
pub fn to_markup<T: ElementTree + ?Sized>(tree: &T, id: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![Tag::Open(id)];
    while let Some(tag) = stack.pop() {
        match tag {
            Tag::Open(node) => {
                if write_open_tag(tree, node, &mut out) {
                    stack.push(Tag::Close(node));
                    stack.extend(tree.children(node).iter().rev().map(|&child| Tag::Open(child)));
                }
            }
            Tag::Close(node) => {
                let _ = write!(out, "</{}>", tree.tag_name(node));
            }
        }
    }
    out
}

/// Pending output of the markup walk.
#[derive(Debug, Clone, Copy)]
enum Tag {
    Open(NodeId),
    Close(NodeId),
}

/// Write the start tag and own text of `id`. Returns false when the tag was
/// self-closing and needs no end tag.
fn write_open_tag<T: ElementTree + ?Sized>(tree: &T, id: NodeId, out: &mut String) -> bool {
    out.push('<');
    out.push_str(tree.tag_name(id));
    for (name, value) in tree.attributes(id) {
        let _ = write!(out, " {name}=\"{}\"", escape(value, true));
    }

    let text = tree.text(id);
    if text.is_empty() && tree.children(id).is_empty() {
        out.push_str("/>");
        return false;
    }

    out.push('>');
    out.push_str(&escape(text, false));
    true
}

fn escape(raw: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Print the subtree rooted at `id` to stdout, one element per line.
pub fn print_tree<T: ElementTree + ?Sized>(tree: &T, id: NodeId, indent: usize) {
    let mut stack = vec![(id, indent)];
    while let Some((node, indent)) = stack.pop() {
        let prefix = "  ".repeat(indent);
        let attrs: Vec<String> = tree
            .attributes(node)
            .map(|(k, v)| {
                if v.is_empty() {
                    k.to_string()
                } else {
                    format!("{k}=\"{v}\"")
                }
            })
            .collect();
        if attrs.is_empty() {
            println!("{prefix}<{}>", tree.tag_name(node));
        } else {
            println!("{prefix}<{} {}>", tree.tag_name(node), attrs.join(" "));
        }

        let text = tree.text(node);
        if !text.is_empty() {
            let display = text.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}  \"{display}\"");
        }

        stack.extend(tree.children(node).iter().rev().map(|&child| (child, indent + 1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomTree, ElementData};

    #[test]
    fn test_to_markup_nested_with_escaping() {
        let mut tree = DomTree::new(ElementData::new("div").with_attr("title", "a \"quote\""));
        let _ = tree
            .append_element(tree.root(), ElementData::new("p").with_text("1 < 2 & 3"))
            .unwrap();
        let _ = tree
            .append_element(tree.root(), ElementData::new("br"))
            .unwrap();

        assert_eq!(
            to_markup(&tree, tree.root()),
            "<div title=\"a &quot;quote&quot;\"><p>1 &lt; 2 &amp; 3</p><br/></div>"
        );
    }

    #[test]
    fn test_to_markup_of_deep_chain() {
        const DEPTH: usize = 100_000;
        let mut tree = DomTree::new(ElementData::new("div"));
        let mut parent = tree.root();
        for _ in 1..DEPTH {
            parent = tree.append_element(parent, ElementData::new("b")).unwrap();
        }
        let _ = tree
            .append_element(parent, ElementData::new("b").with_text("leaf"))
            .unwrap();

        let markup = to_markup(&tree, tree.root());
        assert!(markup.starts_with("<div><b><b>"));
        assert!(markup.ends_with("<b>leaf</b></b></div>"));
        assert_eq!(markup.matches("<b>").count(), DEPTH);
        assert_eq!(markup.matches("</b>").count(), DEPTH);
    }
}
