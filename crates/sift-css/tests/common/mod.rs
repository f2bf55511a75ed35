//! Shared page fixture for the selector and traversal tests.
#![allow(dead_code)]

use sift_css::{NodeSet, query};
use sift_dom::{DomTree, ElementData, NodeId};

/// A small page with 24 elements:
///
/// ```text
/// html > body >
///   h1#title
///   p.top[lang=en-us]
///   img.top.image[src=link]
///   ul > span, li "1" .. li "9", span
///   div > h3
///   div[content=h4] > h4, p
///   p
///   a[data-target="Other page"][lang=en-en][href]
/// ```
///
/// The third `li` carries `data-target="Olala"` and the seventh
/// `data-target="language"`.
pub fn page() -> DomTree {
    let mut tree = DomTree::new(ElementData::new("html"));
    let body = append(&mut tree, NodeId::ROOT, ElementData::new("body"));

    let _ = append(
        &mut tree,
        body,
        ElementData::new("h1")
            .with_attr("id", "title")
            .with_text("My First Heading"),
    );
    let _ = append(
        &mut tree,
        body,
        ElementData::new("p")
            .with_attr("class", "top")
            .with_attr("lang", "en-us")
            .with_text("My first paragraph."),
    );
    let _ = append(
        &mut tree,
        body,
        ElementData::new("img")
            .with_attr("class", "top image")
            .with_attr("src", "link"),
    );

    let list = append(&mut tree, body, ElementData::new("ul"));
    let _ = append(&mut tree, list, ElementData::new("span").with_text("first"));
    for n in 1..=9 {
        let mut item = ElementData::new("li").with_text(n.to_string());
        match n {
            3 => item = item.with_attr("data-target", "Olala"),
            7 => item = item.with_attr("data-target", "language"),
            _ => {}
        }
        let _ = append(&mut tree, list, item);
    }
    let _ = append(&mut tree, list, ElementData::new("span").with_text("last"));

    let first_div = append(&mut tree, body, ElementData::new("div"));
    let _ = append(&mut tree, first_div, ElementData::new("h3").with_text("Only child"));

    let second_div = append(
        &mut tree,
        body,
        ElementData::new("div").with_attr("content", "h4"),
    );
    let _ = append(&mut tree, second_div, ElementData::new("h4"));
    let _ = append(&mut tree, second_div, ElementData::new("p").with_text("Only child"));

    let _ = append(&mut tree, body, ElementData::new("p").with_text("A normal paragraph"));
    let _ = append(
        &mut tree,
        body,
        ElementData::new("a")
            .with_attr("data-target", "Other page")
            .with_attr("lang", "en-en")
            .with_attr("href", "http://www.otherpage.com")
            .with_text("Other page"),
    );

    tree
}

fn append(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    tree.append_element(parent, data).unwrap()
}

/// Query the whole page.
pub fn select<'a>(tree: &'a DomTree, selector: &str) -> NodeSet<'a, DomTree> {
    query(tree, NodeId::ROOT, selector)
}

/// Tag names of the members, in set order.
pub fn tags(set: &NodeSet<'_, DomTree>) -> Vec<String> {
    set.iter()
        .map(|id| set.tree().as_element(id).unwrap().tag_name.clone())
        .collect()
}
