//! html5ever TreeSink implementation that builds a [`NodeArena`].

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, NodeArena, NodeId};

/// Handle used by TreeSink to reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub NodeId);

impl Default for NodeHandle {
    fn default() -> Self {
        NodeHandle(NodeId::NONE)
    }
}

/// TreeSink implementation that builds a NodeArena.
///
/// Uses interior mutability (RefCell) because html5ever's TreeSink trait
/// requires methods to take `&self` but we need to mutate the arena.
pub struct ArenaSink {
    arena: RefCell<NodeArena>,
    quirks_mode: RefCell<QuirksMode>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            arena: RefCell::new(NodeArena::new()),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    /// Consume the sink and return the arena.
    pub fn into_arena(self) -> NodeArena {
        self.arena.into_inner()
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        *self.quirks_mode.borrow()
    }
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|a| Attribute {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

impl TreeSink for ArenaSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: std::borrow::Cow<'static, str>) {
        // Browsers recover from every parse error; so do we.
    }

    fn get_document(&self) -> Self::Handle {
        NodeHandle(self.arena.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let arena = self.arena.borrow();
        match arena.element_qual_name(target.0) {
            // SAFETY: element names are never mutated or dropped while the
            // sink is alive; nodes are only ever appended to the arena's
            // storage, and the tree builder uses the name immediately.
            Some(name) => unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) },
            None => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let id = self
            .arena
            .borrow_mut()
            .create_element(name, convert_attrs(attrs));
        NodeHandle(id)
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        NodeHandle(self.arena.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        // HTML has no processing instructions; keep the payload as a comment.
        NodeHandle(self.arena.borrow_mut().create_comment(data.to_string()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => arena.append(parent.0, node.0),
            NodeOrText::AppendText(text) => arena.append_text(parent.0, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.arena.borrow().parent(element.0).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut arena = self.arena.borrow_mut();
        let doc = arena.document();
        let doctype = arena.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        arena.append(doc, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents are kept inline under the template element.
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => arena.insert_before(sibling.0, node.0),
            NodeOrText::AppendText(text) => {
                let text_node = arena.create_text(text.to_string());
                arena.insert_before(sibling.0, text_node);
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut arena = self.arena.borrow_mut();
        let missing: Vec<_> = attrs
            .into_iter()
            .filter(|a| arena.get_attr(target.0, a.name.local.as_ref()).is_none())
            .collect();
        for attr in missing {
            arena.set_attr(target.0, attr.name.local.as_ref(), &attr.value);
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.arena.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<_> = arena.children(node.0).collect();
        for child in children {
            arena.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::driver::ParseOpts;
    use html5ever::parse_document;
    use html5ever::tendril::TendrilSink;

    use super::*;

    fn parse_html(html: &str) -> NodeArena {
        let sink = ArenaSink::new();
        let result = parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes());
        result.into_arena()
    }

    #[test]
    fn test_basic_parse() {
        let arena = parse_html("<html><body><p>Hello</p></body></html>");

        let p = arena.find_by_tag(arena.document(), "p").expect("should find p");
        let text_id = arena.children(p).next().expect("p should have child");
        assert_eq!(arena.text(text_id), Some("Hello"));
    }

    #[test]
    fn test_attributes() {
        let arena = parse_html(r#"<div id="main" class="container header">Content</div>"#);

        let div = arena.find_by_tag(arena.document(), "div").expect("should find div");
        assert_eq!(arena.element_id(div), Some("main"));
        assert_eq!(arena.element_classes(div), ["container", "header"]);
    }

    #[test]
    fn test_table_rows_get_tbody() {
        let arena = parse_html("<table><tr><td>1</td></tr></table>");

        let tbody = arena
            .find_by_tag(arena.document(), "tbody")
            .expect("tree builder inserts tbody");
        let tr = arena.find_by_tag(tbody, "tr");
        assert!(tr.is_some());
    }

    #[test]
    fn test_misnested_formatting_is_repaired() {
        let arena = parse_html("<p><b>bold<i>both</b>italic</i></p>");

        let p = arena.find_by_tag(arena.document(), "p").unwrap();
        assert_eq!(arena.text_content(p), "boldbothitalic");
    }
}
