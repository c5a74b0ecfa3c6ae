//! Host DOM: an arena-backed HTML tree with selector matching, markup
//! serialization, inline/computed style and per-node event listeners.
//!
//! # Example
//!
//! ```
//! use littledom::Document;
//!
//! let doc = Document::parse("<ul><li class='a'>1</li><li>2</li></ul>");
//! let items = doc.query_selector_all("li.a").unwrap();
//!
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].inner_html(), "1");
//! ```

mod arena;
mod document;
mod element_ref;
mod markup;
mod node;
mod query;
mod style;
mod tree_sink;

pub use arena::{NodeArena, NodeData, NodeId};
pub use document::{DOM_CONTENT_LOADED, Document, DocumentOptions, ReadyState, WeakDocument};
pub use element_ref::{DomSelectors, ElementRef};
pub use node::{Node, NodeType, WeakNode};
pub use query::{Selectors, parse_selectors};
pub use style::{Declaration, InlineStyle, Origin, Specificity, Stylesheet, user_agent_stylesheet};

pub(crate) use markup::{Container, leading_tag};
