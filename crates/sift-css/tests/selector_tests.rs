//! Integration tests for selector matching against a full page.

mod common;

use common::{page, select, tags};
use sift_css::{query, query_first};
use sift_dom::{DomTree, NodeId};

// ========== Simple selectors ==========

#[test]
fn test_universal_selector() {
    let tree = page();
    assert_eq!(select(&tree, "*").count(), 24);
}

#[test]
fn test_type_selector() {
    let tree = page();
    for (tag, expected) in [
        ("html", 1),
        ("body", 1),
        ("h1", 1),
        ("p", 3),
        ("img", 1),
        ("ul", 1),
        ("span", 2),
        ("li", 9),
        ("div", 2),
        ("h3", 1),
        ("h4", 1),
        ("a", 1),
    ] {
        assert_eq!(select(&tree, tag).count(), expected, "{tag}");
    }
    assert_eq!(select(&tree, "foo").count(), 0);
    assert_eq!(select(&tree, "LI").count(), 9);
}

#[test]
fn test_id_and_class_selectors() {
    let tree = page();
    assert_eq!(tags(&select(&tree, "#title")), ["h1"]);
    assert_eq!(select(&tree, "h1#title").count(), 1);
    assert_eq!(select(&tree, "p#title").count(), 0);
    assert_eq!(select(&tree, "#foo").count(), 0);

    assert_eq!(tags(&select(&tree, ".top")), ["p", "img"]);
    assert_eq!(tags(&select(&tree, ".top.image")), ["img"]);
    assert_eq!(tags(&select(&tree, "img.top")), ["img"]);
    assert_eq!(select(&tree, ".image.foo").count(), 0);
    assert_eq!(select(&tree, "img.top.image").count(), 1);
    assert_eq!(select(&tree, "img.top.foo").count(), 0);
}

#[test]
fn test_results_follow_document_order() {
    let tree = page();
    let items = select(&tree, "li");
    assert_eq!(items.text(false, false), "1 2 3 4 5 6 7 8 9");
    assert_eq!(tags(&select(&tree, "body > *").first()), ["h1"]);
}

#[test]
fn test_repeated_query_is_identical() {
    let tree = page();
    for selector in ["li:nth-child(odd)", "h3, h4", "li ~ span", ":not(li)"] {
        assert_eq!(select(&tree, selector), select(&tree, selector), "{selector}");
    }
}

// ========== Attribute selectors ==========

#[test]
fn test_attribute_presence() {
    let tree = page();
    assert_eq!(select(&tree, "[data-target]").count(), 3);
    assert_eq!(select(&tree, "li[data-target]").count(), 2);
    assert_eq!(tags(&select(&tree, "[content]")), ["div"]);
    assert_eq!(select(&tree, "[foo]").count(), 0);
}

#[test]
fn test_attribute_operators() {
    let tree = page();
    assert_eq!(select(&tree, "[src=link]").count(), 1);
    assert_eq!(select(&tree, "[src=\"link\"]").count(), 1);
    assert_eq!(select(&tree, "[src=lin]").count(), 0);
    assert_eq!(select(&tree, "[class~=image]").count(), 1);
    assert_eq!(select(&tree, "[class~=top]").count(), 2);
    assert_eq!(select(&tree, "[data-target^=O]").count(), 2);
    assert_eq!(select(&tree, "[data-target$=age]").count(), 2);
    assert_eq!(select(&tree, "[data-target*=la]").count(), 2);
    assert_eq!(select(&tree, "[lang|=en]").count(), 2);
    assert_eq!(select(&tree, "[lang|=en-us]").count(), 1);
    assert_eq!(select(&tree, "[data-target=\"Other page\"]").count(), 1);
}

#[test]
fn test_attribute_case_insensitive_flag() {
    let tree = page();
    assert_eq!(select(&tree, "[src=LINK]").count(), 0);
    assert_eq!(select(&tree, "[src=LINK i]").count(), 1);
    assert_eq!(select(&tree, "[data-target^=o i]").count(), 2);
}

#[test]
fn test_attribute_unterminated_quote() {
    let tree = page();
    let set = select(&tree, "li[\"data-target*=la]");
    assert_eq!(set.count(), 2);
    assert_eq!(set.text(false, false), "3 7");
}

#[test]
fn test_attribute_without_name_matches_nothing() {
    let tree = page();
    assert_eq!(select(&tree, "[=]").count(), 0);
    assert_eq!(select(&tree, "li[]").count(), 0);
}

// ========== Structural pseudo-classes ==========

#[test]
fn test_root_and_empty() {
    let tree = page();
    assert_eq!(tags(&select(&tree, ":root")), ["html"]);
    assert_eq!(select(&tree, "h4:empty").count(), 1);
    assert_eq!(select(&tree, "div:empty").count(), 0);
    assert_eq!(tags(&select(&tree, ":empty")), ["img", "h4"]);
}

#[test]
fn test_nth_child() {
    let tree = page();
    assert_eq!(select(&tree, "li:nth-child(odd)").count(), 4);
    assert_eq!(select(&tree, "li:nth-child(even)").count(), 5);
    assert_eq!(select(&tree, "li:nth-child(3)").text(false, false), "2");
    assert_eq!(select(&tree, "li:nth-child(-n+3)").text(false, false), "1 2");
    assert_eq!(select(&tree, "li:nth-child(2n+1)").text(false, false), "2 4 6 8");
    assert_eq!(select(&tree, "li:nth-child(20)").count(), 0);
}

#[test]
fn test_nth_last_child() {
    let tree = page();
    assert_eq!(select(&tree, "li:nth-last-child(3)").text(false, false), "8");
    assert_eq!(select(&tree, "li:nth-last-child(even)").text(false, false), "1 3 5 7 9");
}

#[test]
fn test_nth_of_type() {
    let tree = page();
    assert_eq!(select(&tree, "li:nth-of-type(odd)").count(), 5);
    assert_eq!(select(&tree, "li:nth-of-type(8)").text(false, false), "8");
    assert_eq!(select(&tree, "li:nth-last-of-type(3)").text(false, false), "7");
    assert_eq!(select(&tree, "span:nth-of-type(2)").text(false, false), "last");
}

#[test]
fn test_unusable_nth_argument_matches_nothing() {
    let tree = page();
    assert_eq!(select(&tree, "li:nth-child(foo)").count(), 0);
    assert_eq!(select(&tree, "li:nth-child()").count(), 0);
    assert_eq!(select(&tree, "li:nth-child(0n+0)").count(), 0);
}

#[test]
fn test_first_last_and_only() {
    let tree = page();
    assert_eq!(select(&tree, "h4:first-child").count(), 1);
    assert_eq!(select(&tree, "li:first-child").count(), 0);
    assert_eq!(select(&tree, "span:first-child").text(false, false), "first");
    assert_eq!(select(&tree, "span:last-child").text(false, false), "last");
    assert_eq!(select(&tree, "li:first-of-type").text(false, false), "1");
    assert_eq!(select(&tree, "li:last-of-type").text(false, false), "9");

    assert_eq!(select(&tree, "h3:only-child").count(), 1);
    assert_eq!(select(&tree, "h4:only-child").count(), 0);
    assert_eq!(select(&tree, "h3:only-of-type").count(), 1);
    assert_eq!(select(&tree, "h4:only-of-type").count(), 1);
    assert_eq!(select(&tree, "li:only-of-type").count(), 0);
}

#[test]
fn test_unsupported_pseudo_class_matches_nothing() {
    let tree = page();
    assert_eq!(select(&tree, "li:hover").count(), 0);
    assert_eq!(select(&tree, "a:visited").count(), 0);
}

#[test]
fn test_pseudo_element_is_ignored() {
    let tree = page();
    assert_eq!(select(&tree, "p::first-line").count(), 3);
}

// ========== Negation ==========

#[test]
fn test_not() {
    let tree = page();
    assert_eq!(select(&tree, ":not(*)").count(), 0);
    assert_eq!(select(&tree, ":not(foo)").count(), 24);
    assert_eq!(select(&tree, ":not()").count(), 24);
    assert_eq!(select(&tree, ":not(li)").count(), 15);
    assert_eq!(select(&tree, "li:not([data-target])").count(), 7);
    assert_eq!(select(&tree, "li:not(:nth-child(odd))").count(), 5);
}

// ========== Combinators ==========

#[test]
fn test_descendant_combinator() {
    let tree = page();
    assert_eq!(select(&tree, "ul li").count(), 9);
    assert_eq!(select(&tree, "html li").count(), 9);
    assert_eq!(select(&tree, "li ul").count(), 0);
    assert_eq!(select(&tree, "div p").count(), 1);
    assert_eq!(select(&tree, "html html").count(), 0);
}

#[test]
fn test_child_combinator() {
    let tree = page();
    assert_eq!(select(&tree, "ul > li").count(), 9);
    assert_eq!(select(&tree, "html > li").count(), 0);
    assert_eq!(select(&tree, "body > p").count(), 2);
    assert_eq!(select(&tree, "body>p").count(), 2);
    assert_eq!(select(&tree, "html > body > div > h3").count(), 1);
}

#[test]
fn test_next_sibling_combinator() {
    let tree = page();
    assert_eq!(select(&tree, "li:first-of-type + li").text(false, false), "2");
    assert_eq!(tags(&select(&tree, "h1 + p")), ["p"]);
    assert_eq!(select(&tree, "h1 + img").count(), 0);
    assert_eq!(select(&tree, "html + *").count(), 0);
}

#[test]
fn test_subsequent_sibling_combinator() {
    let tree = page();
    assert_eq!(select(&tree, "li:first-of-type ~ li").count(), 8);
    assert_eq!(select(&tree, "li:nth-of-type(5) ~ li").count(), 4);
    assert_eq!(select(&tree, "li ~ span").text(false, false), "last");
    assert_eq!(select(&tree, "a ~ *").count(), 0);
}

#[test]
fn test_leading_combinator_is_relative_to_scope() {
    let tree = page();
    let list = query_first(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(query(&tree, list, "> li").count(), 9);
    assert_eq!(query(&tree, list, "> span").count(), 2);
    assert_eq!(query(&tree, NodeId::ROOT, "> body").count(), 1);
    assert_eq!(query(&tree, NodeId::ROOT, "> li").count(), 0);
}

// ========== Selector groups ==========

#[test]
fn test_group_selector() {
    let tree = page();
    assert_eq!(select(&tree, "h3, h4").count(), 2);
    assert_eq!(select(&tree, "ul, li").count(), 10);
    assert_eq!(select(&tree, "li, li").count(), 9);
    assert_eq!(select(&tree, "ul > li:first-of-type, div > h3").count(), 2);
}

#[test]
fn test_group_with_empty_parts() {
    let tree = page();
    assert_eq!(select(&tree, ", h3").count(), 1);
    assert_eq!(select(&tree, "h3,, h4").count(), 2);
    assert_eq!(select(&tree, "h3, ").count(), 1);
}

#[test]
fn test_group_with_leading_combinators() {
    let tree = page();
    let list = query_first(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(query(&tree, list, "> li, > span").count(), 11);
    assert_eq!(tags(&select(&tree, "h3, > body")), ["h3", "body"]);
    assert_eq!(select(&tree, "h4, > body > h1").count(), 2);
}

#[test]
fn test_empty_selector_matches_nothing() {
    let tree = page();
    assert!(select(&tree, "").is_empty());
    assert!(select(&tree, "   ").is_empty());
}

// ========== Scoped queries ==========

#[test]
fn test_scope_node_can_match() {
    let tree = page();
    let list = query_first(&tree, NodeId::ROOT, "ul").unwrap();
    assert_eq!(query(&tree, list, "ul").nodes(), [list]);
    assert_eq!(query(&tree, list, "*").count(), 12);
    assert_eq!(query(&tree, list, "p").count(), 0);
}

#[test]
fn test_query_first() {
    let tree = page();
    let first = query_first(&tree, NodeId::ROOT, "li").unwrap();
    assert_eq!(tree.as_element(first).unwrap().text, "1");
    assert_eq!(query_first(&tree, NodeId::ROOT, "foo"), None);
}

#[test]
fn test_query_tree_loaded_from_json() {
    let source = r#"{
        "tag": "nav",
        "attrs": { "class": "menu" },
        "children": [
            { "tag": "a", "attrs": { "href": "/" }, "text": "Home" },
            { "tag": "a", "attrs": { "href": "/docs", "class": "active" }, "text": "Docs" },
            { "tag": "span", "text": "|" }
        ]
    }"#;
    let tree = DomTree::from_json(source).unwrap();
    assert_eq!(query(&tree, tree.root(), "nav.menu > a").count(), 2);
    assert_eq!(
        query(&tree, tree.root(), "a.active").text(false, false),
        "Docs"
    );
    assert_eq!(
        query(&tree, tree.root(), "a[href^=\"/d\"] + span").text(false, false),
        "|"
    );
}
