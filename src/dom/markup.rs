//! Markup parsing and serialization.
//!
//! Documents go through html5ever's tree builder into an [`ArenaSink`].
//! Fragments are parsed by wrapping them in a container that puts the tree
//! builder in the right insertion mode (a bare `<tr>` is dropped outside a
//! table), then the container's children are copied into the target arena.

use std::io;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use super::arena::{NodeArena, NodeData, NodeId};
use super::document::DocumentOptions;
use super::tree_sink::ArenaSink;

/// Parse a full HTML document into a fresh arena.
pub fn parse_arena(html: &str, options: &DocumentOptions) -> NodeArena {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: options.scripting_enabled,
            drop_doctype: options.drop_doctype,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(ArenaSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_arena()
}

/// Wrapper used to parse a fragment in the right insertion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Div,
    Table,
    TableBody,
    TableRow,
}

impl Container {
    /// Container for markup whose first tag is `tag`.
    pub fn for_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "tr" => Container::TableBody,
            "tbody" | "thead" | "tfoot" | "caption" | "colgroup" => Container::Table,
            "td" | "th" => Container::TableRow,
            _ => Container::Div,
        }
    }

    /// Container matching an element that receives markup as its children.
    pub fn for_context(tag: &str) -> Self {
        match tag {
            "table" => Container::Table,
            "tbody" | "thead" | "tfoot" => Container::TableBody,
            "tr" => Container::TableRow,
            _ => Container::Div,
        }
    }

    fn wrap(self, markup: &str) -> String {
        match self {
            Container::Div => format!("<body>{markup}"),
            Container::Table => format!("<table>{markup}</table>"),
            Container::TableBody => format!("<table><tbody>{markup}</tbody></table>"),
            Container::TableRow => format!("<table><tbody><tr>{markup}</tr></tbody></table>"),
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Container::Div => "body",
            Container::Table => "table",
            Container::TableBody => "tbody",
            Container::TableRow => "tr",
        }
    }
}

/// Parse `markup` inside `container` and copy the resulting top-level nodes
/// (text included) into `arena` as new parentless nodes, in source order.
pub fn parse_fragment(
    arena: &mut NodeArena,
    markup: &str,
    container: Container,
    options: &DocumentOptions,
) -> Vec<NodeId> {
    let parsed = parse_arena(&container.wrap(markup), options);
    let Some(holder) = parsed.find_by_tag(parsed.document(), container.tag()) else {
        return Vec::new();
    };
    parsed
        .children(holder)
        .filter_map(|child| arena.adopt(&parsed, child))
        .collect()
}

/// Name of the first tag when `markup` starts (after whitespace) with
/// something shaped like `<name ...>` or `<!...>`.
///
/// Returns `"!"` for comments and doctypes.
pub fn leading_tag(markup: &str) -> Option<&str> {
    let rest = markup.trim_start().strip_prefix('<')?;
    let name_len = if rest.starts_with('!') {
        1
    } else {
        rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len())
    };
    if name_len == 0 {
        return None;
    }
    rest[name_len..].contains('>').then(|| &rest[..name_len])
}

/// Borrowed view of one node that html5ever can serialize.
pub struct SerializableNode<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(arena: &'a NodeArena, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn write_node<S: Serializer>(&self, id: NodeId, out: &mut S) -> io::Result<()> {
        let Some(node) = self.arena.get(id) else {
            return Ok(());
        };
        match &node.data {
            NodeData::Element { name, attrs, .. } => {
                out.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                self.write_children(id, out)?;
                out.end_elem(name.clone())
            }
            NodeData::Text(text) => out.write_text(text),
            NodeData::Comment(text) => out.write_comment(text),
            NodeData::Doctype { name, .. } => out.write_doctype(name),
            NodeData::Document => self.write_children(id, out),
            NodeData::Window => Ok(()),
        }
    }

    fn write_children<S: Serializer>(&self, id: NodeId, out: &mut S) -> io::Result<()> {
        for child in self.arena.children(id) {
            self.write_node(child, out)?;
        }
        Ok(())
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => self.write_node(self.id, serializer),
            TraversalScope::ChildrenOnly(_) => self.write_children(self.id, serializer),
        }
    }
}

fn serialize_to_string(node: &SerializableNode<'_>, traversal_scope: TraversalScope) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    match serialize(&mut bytes, node, opts) {
        Ok(()) => String::from_utf8(bytes).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Markup of a node's children (`innerHTML`).
pub fn inner_html(arena: &NodeArena, id: NodeId) -> String {
    // The parent name tells the serializer not to escape script/style text.
    let parent = arena.element_qual_name(id).cloned();
    serialize_to_string(
        &SerializableNode::new(arena, id),
        TraversalScope::ChildrenOnly(parent),
    )
}

/// Markup of a node including itself (`outerHTML`).
pub fn outer_html(arena: &NodeArena, id: NodeId) -> String {
    serialize_to_string(&SerializableNode::new(arena, id), TraversalScope::IncludeNode)
}
