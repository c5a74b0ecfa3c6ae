//! Reads and writes: markup, attributes, classes, style, data and tree
//! insertion.

use super::Selection;
use crate::dom::{Container, Node, leading_tag};
use crate::error::Result;

/// Something `append`/`prepend` can insert.
#[derive(Debug, Clone)]
pub enum Content {
    /// Markup, parsed into new nodes at insertion time.
    Markup(String),
    Node(Node),
    Nodes(Vec<Node>),
    /// Several contents, flattened in order.
    List(Vec<Content>),
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Content::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Content::Markup(markup)
    }
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<&Node> for Content {
    fn from(node: &Node) -> Self {
        Content::Node(node.clone())
    }
}

impl From<Vec<Node>> for Content {
    fn from(nodes: Vec<Node>) -> Self {
        Content::Nodes(nodes)
    }
}

impl From<&Selection> for Content {
    fn from(selection: &Selection) -> Self {
        Content::Nodes(selection.to_array().to_vec())
    }
}

impl From<Selection> for Content {
    fn from(selection: Selection) -> Self {
        Content::Nodes(selection.into_vec())
    }
}

impl From<Vec<Content>> for Content {
    fn from(contents: Vec<Content>) -> Self {
        Content::List(contents)
    }
}

/// Map jQuery-style property keys to attribute names.
fn attribute_name(name: &str) -> &str {
    match name {
        "class" | "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

fn class_tokens(names: &str) -> Vec<&str> {
    names.split_whitespace().collect()
}

impl Selection {
    /// Resolve `content` into concrete nodes, parsing markup into this
    /// selection's document.
    fn content_nodes(&self, content: Content, out: &mut Vec<Node>) {
        match content {
            Content::Markup(markup) if markup.is_empty() => {}
            Content::Markup(markup) => {
                let container = Container::for_tag(leading_tag(&markup).unwrap_or_default());
                out.extend(self.doc.parse_fragment(&markup, container));
            }
            Content::Node(node) => out.push(node),
            Content::Nodes(nodes) => out.extend(nodes),
            Content::List(contents) => {
                for content in contents {
                    self.content_nodes(content, out);
                }
            }
        }
    }

    /// `innerHTML` of the first node.
    pub fn html(&self) -> Option<String> {
        self.results.first().map(Node::inner_html)
    }

    /// Set the `innerHTML` of every node.
    pub fn set_html(&self, markup: &str) -> &Self {
        for node in &self.results {
            node.set_inner_html(markup);
        }
        self
    }

    /// Attribute of the first node. `class`/`className` read the class
    /// attribute and `htmlFor` reads `for`.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.results
            .first()
            .and_then(|node| node.get_attribute(attribute_name(name)))
    }

    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        let name = attribute_name(name);
        for node in self.elements() {
            node.set_attribute(name, value);
        }
        self
    }

    /// Set several attributes on every element.
    pub fn set_attrs<I, K, V>(&self, attrs: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        for node in self.elements() {
            for (name, value) in &attrs {
                node.set_attribute(attribute_name(name.as_ref()), value.as_ref());
            }
        }
        self
    }

    pub fn remove_attr(&self, name: &str) -> &Self {
        let name = attribute_name(name);
        for node in &self.results {
            node.remove_attribute(name);
        }
        self
    }

    /// Add each whitespace-separated class that an element lacks.
    pub fn add_class(&self, names: &str) -> &Self {
        let wanted = class_tokens(names);
        if wanted.is_empty() {
            return self;
        }
        for node in self.elements() {
            let mut classes = node.class_list();
            let before = classes.len();
            for class in &wanted {
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
            }
            if classes.len() != before {
                node.set_class_name(&classes.join(" "));
            }
        }
        self
    }

    /// Remove each whitespace-separated class, matching whole tokens only.
    pub fn remove_class(&self, names: &str) -> &Self {
        let unwanted = class_tokens(names);
        for node in self.elements() {
            if !node.has_attribute("class") {
                continue;
            }
            let classes: Vec<String> = node
                .class_list()
                .into_iter()
                .filter(|c| !unwanted.contains(&c.as_str()))
                .collect();
            node.set_class_name(&classes.join(" "));
        }
        self
    }

    /// Flip `name` on every element. `force` pins the outcome: `Some(true)`
    /// only adds, `Some(false)` only removes.
    pub fn toggle_class(&self, name: &str, force: Option<bool>) -> &Self {
        let name = name.trim();
        if name.is_empty() {
            return self;
        }
        for node in self.elements() {
            let has = node.has_class(name);
            if !has && force != Some(false) {
                let mut classes = node.class_list();
                classes.push(name.to_string());
                node.set_class_name(&classes.join(" "));
            } else if has && force != Some(true) {
                let classes: Vec<String> =
                    node.class_list().into_iter().filter(|c| c != name).collect();
                node.set_class_name(&classes.join(" "));
            }
        }
        self
    }

    /// True if any node carries every class in `names`.
    pub fn has_class(&self, names: &str) -> bool {
        let wanted = class_tokens(names);
        if wanted.is_empty() {
            return false;
        }
        self.some(|node, _| wanted.iter().all(|class| node.has_class(class)))
    }

    /// Set inline `display: none` on every element.
    pub fn hide(&self) -> &Self {
        self.set_css("display", "none")
    }

    /// Set inline `display: inherit` on every element.
    pub fn show(&self) -> &Self {
        self.set_css("display", "inherit")
    }

    /// Detach every node from its parent. The selection keeps them.
    pub fn remove(&self) -> &Self {
        for node in &self.results {
            node.remove();
        }
        self
    }

    /// Append `content` to every node, in order.
    ///
    /// Nodes are moved, not cloned: with several targets they end up under
    /// the last one.
    pub fn append(&self, content: impl Into<Content>) -> Result<&Self> {
        let mut nodes = Vec::new();
        self.content_nodes(content.into(), &mut nodes);
        for target in &self.results {
            for node in &nodes {
                target.append_child(node)?;
            }
        }
        Ok(self)
    }

    /// Insert `content` at the start of every node, keeping its order.
    pub fn prepend(&self, content: impl Into<Content>) -> Result<&Self> {
        let mut nodes = Vec::new();
        self.content_nodes(content.into(), &mut nodes);
        for target in &self.results {
            let reference = target
                .child_nodes()
                .into_iter()
                .find(|child| !nodes.contains(child));
            for node in &nodes {
                target.insert_before(node, reference.as_ref())?;
            }
        }
        Ok(self)
    }

    /// Inline style of the first node, else its computed style.
    pub fn css(&self, property: &str) -> Option<String> {
        let first = self.results.first()?;
        first
            .style(property)
            .or_else(|| first.computed_style(property))
    }

    /// Set one inline style property on every element. An empty value
    /// clears it.
    pub fn set_css(&self, property: &str, value: &str) -> &Self {
        for node in self.elements() {
            node.set_style(property, value);
        }
        self
    }

    /// Append `name:value;` pairs to every element's inline style.
    pub fn set_css_map<I, K, V>(&self, properties: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let css: String = properties
            .into_iter()
            .map(|(name, value)| {
                format!(
                    "{}:{};",
                    crate::util::css_property_name(name.as_ref()),
                    value.as_ref()
                )
            })
            .collect();
        for node in self.elements() {
            node.append_css_text(&css);
        }
        self
    }

    /// `data-*` value of the first node that has a non-empty one. `name` is
    /// camelCase: `userId` reads `data-user-id`.
    pub fn data(&self, name: &str) -> Option<String> {
        self.results
            .iter()
            .filter_map(|node| node.data(name))
            .find(|value| !value.is_empty())
    }

    pub fn set_data(&self, name: &str, value: &str) -> &Self {
        for node in self.elements() {
            node.set_data(name, value);
        }
        self
    }
}
