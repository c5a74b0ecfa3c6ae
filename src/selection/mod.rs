//! The query result wrapper.
//!
//! A [`Selection`] is an ordered snapshot of nodes produced by
//! [`Document::select`]. Later DOM mutations never resize or reorder it.

mod events;
mod manipulate;

use std::collections::HashSet;
use std::ops::{Deref, RangeBounds};

use tracing::trace;

pub use manipulate::Content;

use crate::dom::{Container, Document, Node, leading_tag, parse_selectors};
use crate::error::Result;

/// What [`Document::select`] was asked for.
#[derive(Debug, Clone, Default)]
pub enum Query {
    /// Nothing: an empty selection.
    #[default]
    Empty,
    /// Exactly this node (an element, the document or the window).
    Node(Node),
    /// Markup to parse into new, detached nodes.
    Markup(String),
    /// A CSS selector group, matched against the context's descendants.
    Selector(String),
}

impl Query {
    /// Classify a string: empty, markup (it starts with something shaped
    /// like a tag) or a selector.
    pub fn classify(query: &str) -> Self {
        if query.is_empty() {
            Query::Empty
        } else if leading_tag(query).is_some() {
            Query::Markup(query.to_string())
        } else {
            Query::Selector(query.to_string())
        }
    }
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Query::classify(query)
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Query::classify(&query)
    }
}

impl From<&String> for Query {
    fn from(query: &String) -> Self {
        Query::classify(query)
    }
}

impl From<Node> for Query {
    fn from(node: Node) -> Self {
        Query::Node(node)
    }
}

impl From<&Node> for Query {
    fn from(node: &Node) -> Self {
        Query::Node(node.clone())
    }
}

impl<T: Into<Query>> From<Option<T>> for Query {
    fn from(query: Option<T>) -> Self {
        query.map(Into::into).unwrap_or_default()
    }
}

/// An ordered set of matched nodes with jQuery-style operations.
#[derive(Debug, Clone)]
pub struct Selection {
    doc: Document,
    results: Vec<Node>,
    context: Node,
}

impl Document {
    /// `$dom(query)`: resolve `query` against the whole document.
    pub fn select(&self, query: impl Into<Query>) -> Result<Selection> {
        self.select_in(query, &self.root())
    }

    /// `$dom(query, context)`: resolve `query` against `context`.
    ///
    /// A context that cannot be queried (the window, a text or comment node,
    /// a node of another document) yields an empty selection, and so does a
    /// [`Query::Node`] of another document. Markup ignores the context.
    pub fn select_in(&self, query: impl Into<Query>, context: &Node) -> Result<Selection> {
        let query = query.into();
        if let Query::Markup(markup) = &query {
            return Ok(self.create(markup));
        }
        if matches!(query, Query::Empty) {
            return Ok(Selection::empty(self));
        }
        if !context.is_queryable() || !context.document().ptr_eq(self) {
            trace!(?context, "unusable query context");
            return Ok(Selection::empty(self));
        }

        let results = match query {
            Query::Node(node) if !node.document().ptr_eq(self) => {
                trace!(?node, "node of another document");
                Vec::new()
            }
            Query::Node(node) => vec![node],
            Query::Selector(selector) => context.query_selector_all(&selector)?,
            Query::Empty | Query::Markup(_) => Vec::new(),
        };
        Ok(Selection {
            doc: self.clone(),
            results,
            context: context.clone(),
        })
    }

    /// `$dom.create(markup)`: parse markup into new, detached nodes (text
    /// nodes included) without inserting them anywhere.
    pub fn create(&self, markup: &str) -> Selection {
        let markup = markup.trim();
        let container = Container::for_tag(leading_tag(markup).unwrap_or_default());
        let results = self.parse_fragment(markup, container);
        Selection::new(self, results)
    }
}

impl Selection {
    /// Wrap `results` with the document as context.
    pub fn new(doc: &Document, results: Vec<Node>) -> Self {
        Self {
            doc: doc.clone(),
            results,
            context: doc.root(),
        }
    }

    pub fn empty(doc: &Document) -> Self {
        Self::new(doc, Vec::new())
    }

    fn derive(&self, results: Vec<Node>) -> Self {
        Self::new(&self.doc, results)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The node the query ran against; the document root by default.
    pub fn context(&self) -> &Node {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.results.iter()
    }

    /// The backing list itself.
    pub fn to_array(&self) -> &[Node] {
        &self.results
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.results
    }

    /// Replace `range` of the backing list with `replace_with`, returning the
    /// removed nodes. Indexing and `len` follow the new list.
    pub fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<Node>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = Node>,
    {
        self.results.splice(range, replace_with).collect()
    }

    /// Descendants of every node matching `selector`, concatenated in set
    /// order, as a new selection.
    pub fn find(&self, selector: &str) -> Result<Selection> {
        let selectors = parse_selectors(selector)?;
        let results = self
            .results
            .iter()
            .filter(|node| node.is_queryable())
            .flat_map(|node| node.select_parsed(&selectors))
            .collect();
        Ok(self.derive(results))
    }

    /// Distinct direct parents, in first-seen order.
    pub fn parent(&self) -> Selection {
        let parents: Vec<Node> = self.results.iter().filter_map(Node::parent_node).collect();
        Self::unique_of(&self.doc, parents)
    }

    /// The distinct nodes, in first-seen order.
    pub fn unique(&self) -> Selection {
        Self::unique_of(&self.doc, self.results.clone())
    }

    fn unique_of(doc: &Document, nodes: Vec<Node>) -> Selection {
        let mut seen = HashSet::with_capacity(nodes.len());
        let uniques = nodes
            .into_iter()
            .filter(|node| seen.insert(node.clone()))
            .collect();
        Selection::new(doc, uniques)
    }

    pub fn first(&self) -> Selection {
        self.derive(self.results.first().cloned().into_iter().collect())
    }

    pub fn last(&self) -> Selection {
        self.derive(self.results.last().cloned().into_iter().collect())
    }

    /// The nearest ancestor element of the first node whose tag is `tag`
    /// (case-insensitive). Only bare tag names are supported; the node
    /// itself is not considered.
    pub fn closest(&self, tag: &str) -> Selection {
        let found = self.results.first().and_then(|first| {
            std::iter::successors(first.parent_element(), Node::parent_element).find(|el| {
                el.local_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            })
        });
        self.derive(found.into_iter().collect())
    }

    /// Call `f(node, index)` for every node.
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Node, usize),
    {
        for (index, node) in self.results.iter().enumerate() {
            f(node, index);
        }
        self
    }

    /// Alias of [`Selection::each`].
    pub fn for_each<F>(&self, f: F) -> &Self
    where
        F: FnMut(&Node, usize),
    {
        self.each(f)
    }

    pub fn map<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&Node, usize) -> T,
    {
        self.results
            .iter()
            .enumerate()
            .map(|(index, node)| f(node, index))
            .collect()
    }

    pub fn filter<F>(&self, mut f: F) -> Vec<Node>
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.results
            .iter()
            .enumerate()
            .filter(|(index, node)| f(node, *index))
            .map(|(_, node)| node.clone())
            .collect()
    }

    /// True if `f` holds for at least one node.
    pub fn some<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.results
            .iter()
            .enumerate()
            .any(|(index, node)| f(node, index))
    }

    /// True if `f` holds for every node (vacuously true when empty).
    pub fn every<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.results
            .iter()
            .enumerate()
            .all(|(index, node)| f(node, index))
    }

    /// Element nodes only, for operations that only make sense on elements.
    fn elements(&self) -> impl Iterator<Item = &Node> {
        self.results.iter().filter(|node| node.is_element())
    }
}

impl Deref for Selection {
    type Target = [Node];

    fn deref(&self) -> &[Node] {
        &self.results
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for Selection {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
