//! Selection construction, traversal and container-style helpers.

mod common;

use common::fixture;
use littledom::{Document, Error, NodeType, Query, Selection};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_tag_query() {
    let doc = fixture();
    let headings = doc.select("h6").unwrap();

    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].tag_name().as_deref(), Some("H6"));
}

#[test]
fn test_query_without_matches() {
    let doc = fixture();
    let none = doc.select("h6.doesnotexist").unwrap();

    assert_eq!(none.len(), 0);
    assert!(none.get(0).is_none());
    assert_eq!(none.html(), None);
    assert_eq!(none.attr("id"), None);
}

#[test]
fn test_empty_query() {
    let doc = fixture();

    assert!(doc.select("").unwrap().is_empty());
    assert!(doc.select(None::<&str>).unwrap().is_empty());
    assert!(doc.select(Query::Empty).unwrap().is_empty());
}

#[test]
fn test_context_argument() {
    let doc = fixture();
    let list = doc.get_element_by_id("listTest").unwrap();

    assert_eq!(doc.select_in("div", &list).unwrap().len(), 1);
    assert_eq!(doc.select("div").unwrap().len(), 3);
}

#[test]
fn test_invalid_context_is_empty() {
    let doc = fixture();
    let heading_text = doc.select("h6").unwrap()[0].first_child().unwrap();
    assert_eq!(heading_text.node_type(), NodeType::Text);

    assert_eq!(doc.select_in("div", &heading_text).unwrap().len(), 0);
    assert_eq!(doc.select_in("div", &doc.window()).unwrap().len(), 0);
}

#[test]
fn test_node_of_another_document_is_empty() {
    let doc = Document::parse("<div id=scope><li>a</li></div>");
    let other = Document::parse("<ul id=scope><li id=real>b</li></ul>");
    let foreign = other.get_element_by_id("scope").unwrap();

    assert!(doc.select(&foreign).unwrap().is_empty());
    assert_eq!(other.select(&foreign).unwrap().len(), 1);
    assert_eq!(doc.select(doc.window()).unwrap().len(), 1);
}

#[test]
fn test_invalid_selector_is_an_error() {
    let doc = fixture();
    let err = doc.select("li:::").unwrap_err();

    match err {
        Error::InvalidSelector { selector, .. } => assert_eq!(selector, "li:::"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_markup_query_creates_detached_nodes() {
    let doc = fixture();
    let created = doc.select("<p class='new'>one</p>text<p>two</p>").unwrap();

    assert_eq!(created.len(), 3);
    assert_eq!(created[1].node_type(), NodeType::Text);
    assert!(created.iter().all(|node| node.parent_node().is_none()));
    assert!(doc.select("p.new").unwrap().is_empty());
}

#[test]
fn test_markup_query_keeps_sibling_order() {
    let doc = Document::new();
    let created = doc.select(r#"<div class="a"></div><div class="b"></div>"#).unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].class_name(), "a");
    assert_eq!(created[1].class_name(), "b");
    assert!(created.iter().all(|node| node.parent_node().is_none()));
}

#[test]
fn test_markup_ignores_context() {
    let doc = fixture();
    let text = doc.select("h6").unwrap()[0].first_child().unwrap();
    let created = doc.select_in("<span>x</span>", &text).unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].local_name().as_deref(), Some("span"));
}

#[test]
fn test_create_table_parts() {
    let doc = Document::new();

    let row = doc.create("  <tr><td>a</td><td>b</td></tr>  ");
    assert_eq!(row.len(), 1);
    assert_eq!(row[0].tag_name().as_deref(), Some("TR"));
    assert_eq!(row[0].children().len(), 2);

    let cell = doc.create("<td>c</td>");
    assert_eq!(cell[0].local_name().as_deref(), Some("td"));

    let body = doc.create("<tbody><tr><td>d</td></tr></tbody>");
    assert_eq!(body[0].local_name().as_deref(), Some("tbody"));
}

#[test]
fn test_comment_markup() {
    let doc = Document::new();
    let created = doc.create("<!-- note -->");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].node_type(), NodeType::Comment);
}

// ============================================================================
// Container-style helpers
// ============================================================================

#[test]
fn test_each() {
    let doc = fixture();
    let mut count = 0;
    let mut indexes = Vec::new();

    doc.select("#listTest > li").unwrap().each(|_, idx| {
        count += 1;
        indexes.push(idx);
    });

    assert_eq!(count, 4);
    assert_eq!(indexes, [0, 1, 2, 3]);
}

#[test]
fn test_map() {
    let doc = fixture();
    let result = doc
        .select("#listTest > li")
        .unwrap()
        .map(|node, _| node.inner_html());

    assert_eq!(result, ["1", "2", "3", "4"]);
}

#[test]
fn test_filter() {
    let doc = fixture();
    let result = doc
        .select("#listTest > li")
        .unwrap()
        .filter(|node, _| node.class_name() == "last");

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].inner_html(), "4");
}

#[test]
fn test_some_and_every() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    assert!(items.some(|node, _| node.has_class("last")));
    assert!(!items.every(|node, _| node.has_class("last")));
    assert!(items.every(|node, _| node.is_element()));
}

#[test]
fn test_iteration_forms() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    let by_ref: Vec<String> = (&items).into_iter().map(|n| n.text_content()).collect();
    let by_slice: Vec<String> = items.to_array().iter().map(|n| n.text_content()).collect();
    assert_eq!(by_ref, by_slice);

    let owned: Vec<_> = items.clone().into_iter().collect();
    assert_eq!(owned.len(), 4);
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn test_find_is_independent() {
    let doc = fixture();
    let list = doc.select("#listTest").unwrap();
    let items = list.find("li").unwrap();

    assert_eq!(items.len(), 4);
    assert_eq!(list.len(), 1);
    assert!(matches!(list.find("li["), Err(Error::InvalidSelector { .. })));
}

#[test]
fn test_find_concatenates_in_set_order() {
    let doc = Document::parse("<div class=g><i>1</i></div><div class=g><i>2</i><i>3</i></div>");
    let found = doc.select(".g").unwrap().find("i").unwrap();

    assert_eq!(found.map(|n, _| n.text_content()), ["1", "2", "3"]);
}

#[test]
fn test_parent_deduplicates() {
    let doc = fixture();
    let parents = doc.select("#listTest > li").unwrap().parent();

    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].element_id(), "listTest");
}

#[test]
fn test_first_last_unique() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    assert_eq!(items.first()[0].text_content(), "1");
    assert_eq!(items.last()[0].text_content(), "4");

    let doubled = Selection::new(&doc, [items.to_array(), items.to_array()].concat());
    assert_eq!(doubled.len(), 8);
    assert_eq!(doubled.unique().len(), 4);
}

#[test]
fn test_closest() {
    let doc = fixture();
    let item = doc.select(".last").unwrap();

    assert_eq!(item.closest("ul")[0].element_id(), "listTest");
    assert_eq!(item.closest("BODY").len(), 1);
    assert!(item.closest("li").is_empty());
}
