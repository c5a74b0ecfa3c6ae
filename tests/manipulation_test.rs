//! Content, attribute, class, style and data operations on selections.

mod common;

use std::io::Write;

use common::{FIXTURE, fixture};
use littledom::{Content, Document, DocumentOptions, Error};
use proptest::prelude::*;
use tempfile::NamedTempFile;

// ============================================================================
// Markup
// ============================================================================

#[test]
fn test_html_single_element() {
    let doc = fixture();

    assert_eq!(doc.select("#htmlTest").unwrap().html().as_deref(), Some("foo"));
    doc.select("#htmlTest").unwrap().set_html("bar");
    assert_eq!(doc.query_selector_all("#htmlTest").unwrap()[0].inner_html(), "bar");
}

#[test]
fn test_html_multiple_elements() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    assert_eq!(items.html().as_deref(), Some("1"));
    items.set_html("bar");
    for item in doc.query_selector_all("#listTest > li").unwrap() {
        assert_eq!(item.inner_html(), "bar");
    }
}

#[test]
fn test_repeated_set_html_stays_bounded() {
    let doc = Document::parse("<div id=c></div>");
    let target = doc.select("#c").unwrap();
    target.set_html("<span>start</span>");
    doc.collect_garbage();
    let live = doc.node_count();

    for i in 0..1000 {
        target.set_html(&format!("<span>{i}</span>"));
    }

    assert_eq!(doc.node_count(), live);
    assert_eq!(target.find("span").unwrap().len(), 1);
}

#[test]
fn test_set_html_in_table_context() {
    let doc = Document::parse("<table><tbody id=rows></tbody></table>");
    let rows = doc.select("#rows").unwrap();

    rows.set_html("<tr><td>1</td></tr>");
    assert_eq!(rows.find("td").unwrap().len(), 1);
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_attr_and_remove_attr() {
    let doc = fixture();

    assert_eq!(doc.select("#hideTest").unwrap().attr("id").as_deref(), Some("hideTest"));
    let renamed = doc.select("#hideTest").unwrap();
    renamed.set_attr("id", "foo");
    assert_eq!(renamed[0].element_id(), "foo");

    let foo = doc.select("#foo").unwrap();
    foo.remove_attr("id");
    assert_eq!(foo[0].element_id(), "");
    assert!(doc.select("#foo").unwrap().is_empty());
}

#[test]
fn test_class_name_aliases() {
    let doc = Document::parse("<label id=l>x</label>");
    let label = doc.select("#l").unwrap();

    label.set_attrs([("className", "a b"), ("htmlFor", "name")]);
    assert_eq!(label.attr("class").as_deref(), Some("a b"));
    assert_eq!(label.attr("for").as_deref(), Some("name"));
    assert!(label.has_class("b"));
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_has_class() {
    let doc = fixture();

    assert!(!doc.select("li").unwrap().has_class("asdfasdf"));
    assert!(doc.select("li").unwrap().has_class("last"));
}

#[test]
fn test_class_edits_on_every_element() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    items.add_class("item");
    assert!(items.every(|node, _| node.has_class("item")));
    assert_eq!(items[3].class_name(), "last item");

    items.remove_class("item last");
    assert!(items.every(|node, _| node.class_name().is_empty()));

    items.toggle_class("odd", None);
    items.first().toggle_class("odd", None);
    assert_eq!(items.filter(|node, _| node.has_class("odd")).len(), 3);
}

#[test]
fn test_remove_class_without_attribute() {
    let doc = Document::parse("<p id=p>x</p>");
    let p = doc.select("#p").unwrap();

    p.remove_class("missing");
    assert!(!p[0].has_attribute("class"));
}

// ============================================================================
// Style and visibility
// ============================================================================

#[test]
fn test_css_reads_computed_and_writes_inline() {
    let doc = fixture();
    let selector = "#listTest li:first-child";

    assert_eq!(doc.select(selector).unwrap().css("color").as_deref(), Some("red"));

    doc.select(selector).unwrap().set_css("color", "blue");
    let first = &doc.query_selector_all(selector).unwrap()[0];
    assert_eq!(first.style("color").as_deref(), Some("blue"));
    assert_eq!(doc.select(selector).unwrap().css("color").as_deref(), Some("blue"));
}

#[test]
fn test_css_inherits_and_defaults() {
    let doc = fixture();

    assert_eq!(doc.select("#listTest li:first-child").unwrap().css("display").as_deref(), Some("list-item"));
    assert_eq!(doc.select("#htmlTest").unwrap().css("display").as_deref(), Some("block"));
    assert_eq!(doc.select("#htmlTest").unwrap().css("color").as_deref(), Some("black"));
}

#[test]
fn test_hide_and_show() {
    let doc = fixture();

    assert_eq!(doc.select("#hideTest").unwrap()[0].style("display"), None);
    assert_eq!(
        doc.select("#hideTest").unwrap().hide()[0].style("display").as_deref(),
        Some("none")
    );
    assert_eq!(
        doc.select("#hideTest").unwrap().show()[0].style("display").as_deref(),
        Some("inherit")
    );
}

#[test]
fn test_css_map_camel_case() {
    let doc = fixture();
    let target = doc.select("#htmlTest").unwrap();

    target.set_css_map([("backgroundColor", "red"), ("marginTop", "2px")]);
    assert_eq!(target.css("background-color").as_deref(), Some("red"));
    assert_eq!(target[0].get_attribute("style").as_deref(), Some("background-color: red; margin-top: 2px;"));
}

// ============================================================================
// Data
// ============================================================================

#[test]
fn test_data_round_trip() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    assert_eq!(items.data("userId"), None);
    items.set_data("userId", "42");
    assert_eq!(items[0].get_attribute("data-user-id").as_deref(), Some("42"));
    assert_eq!(items.data("userId").as_deref(), Some("42"));
}

// ============================================================================
// Tree insertion
// ============================================================================

#[test]
fn test_append_markup_and_nodes() {
    let doc = fixture();
    let list = doc.select("#listTest").unwrap();
    let heading = doc.select("h6").unwrap();

    list.append("<li>5</li>").unwrap().append(&heading).unwrap();

    let children = list[0].children();
    assert_eq!(children[5].text_content(), "5");
    assert_eq!(children[6].local_name().as_deref(), Some("h6"));
    assert_eq!(doc.select("body > h6").unwrap().len(), 0);
}

#[test]
fn test_prepend_preserves_order() {
    let doc = fixture();
    let list = doc.select("#listTest").unwrap();

    list.prepend(Content::List(vec!["<li>a</li>".into(), "<li>b</li>".into()]))
        .unwrap();

    let texts: Vec<String> = list[0].children().iter().map(|n| n.text_content()).collect();
    assert_eq!(&texts[..3], ["a", "b", "1"]);
}

#[test]
fn test_append_moves_to_last_target() {
    let doc = Document::parse("<div class=t id=one></div><div class=t id=two></div>");
    let targets = doc.select(".t").unwrap();

    targets.append("<span>x</span>").unwrap();
    assert_eq!(doc.select("#one span").unwrap().len(), 0);
    assert_eq!(doc.select("#two span").unwrap().len(), 1);
}

#[test]
fn test_append_into_own_descendant_fails() {
    let doc = fixture();
    let list = doc.select("#listTest").unwrap();
    let item = doc.select(".last").unwrap();

    assert!(matches!(item.append(&list), Err(Error::HierarchyRequest(_))));
}

#[test]
fn test_remove_keeps_selection() {
    let doc = fixture();
    let items = doc.select("#listTest > li").unwrap();

    items.remove();
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|node| node.parent_node().is_none()));

    doc.select("body").unwrap().append(&items).unwrap();
    assert_eq!(doc.select("body > li").unwrap().len(), 4);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_open_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();

    let doc = Document::open(file.path()).unwrap();
    assert_eq!(doc.select("#listTest > li").unwrap().len(), 4);

    assert!(matches!(Document::open("/definitely/not/here.html"), Err(Error::Io(_))));
}

#[test]
fn test_parse_bytes_legacy_charset() {
    let bytes = b"<meta charset=\"windows-1252\"><p id=p>caf\xe9</p>";
    let doc = Document::parse_bytes(bytes);

    assert_eq!(doc.get_element_by_id("p").unwrap().text_content(), "caf\u{e9}");
}

#[test]
fn test_drop_doctype_option() {
    let doc = Document::parse_with(FIXTURE, DocumentOptions::new().with_drop_doctype(true));
    assert!(!doc.to_html().starts_with("<!DOCTYPE"));

    let kept = Document::parse(FIXTURE);
    assert!(kept.to_html().starts_with("<!DOCTYPE html>"));
}

// ============================================================================
// Properties
// ============================================================================

fn class_token() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,6}"
}

proptest! {
    #[test]
    fn prop_add_class_is_idempotent(tokens in prop::collection::vec(class_token(), 1..6)) {
        let doc = Document::parse("<p id=p>x</p>");
        let p = doc.select("#p").unwrap();
        let names = tokens.join(" ");

        p.add_class(&names);
        let once = p[0].class_name();
        p.add_class(&names);

        prop_assert_eq!(p[0].class_name(), once);
        prop_assert!(p.has_class(&names));
    }

    #[test]
    fn prop_remove_class_drops_only_whole_tokens(
        keep in class_token(),
        drop in class_token(),
    ) {
        prop_assume!(keep != drop);
        let doc = Document::parse("<p id=p>x</p>");
        let p = doc.select("#p").unwrap();

        p.add_class(&format!("{keep} {drop}"));
        p.remove_class(&drop);

        prop_assert!(p.has_class(&keep));
        prop_assert!(!p.has_class(&drop));
    }

    #[test]
    fn prop_toggle_twice_restores(token in class_token()) {
        let doc = Document::parse("<p id=p class='base'>x</p>");
        let p = doc.select("#p").unwrap();

        p.toggle_class(&token, None);
        p.toggle_class(&token, None);

        prop_assert_eq!(p.has_class(&token), token == "base");
    }
}
