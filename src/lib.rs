//! # littledom
//!
//! A small jQuery-style wrapper for querying, editing and listening to an
//! HTML document.
//!
//! ## Features
//!
//! - CSS selector queries and markup-to-node parsing behind one entry point
//! - Traversal, attribute, class, style and `data-*` helpers on a [`Selection`]
//! - Direct and delegated event listeners with namespace stripping
//! - A `ready` queue tied to the document's loading state
//!
//! ## Quick Start
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use littledom::{Document, Handler};
//!
//! let doc = Document::parse("<ul id='menu'><li>Home</li><li>About</li></ul>");
//! let menu = doc.select("#menu").unwrap();
//!
//! let clicks = Rc::new(Cell::new(0));
//! let seen = clicks.clone();
//! let handler = Handler::new(move |_| seen.set(seen.get() + 1));
//! menu.on_delegated("click", "li", &handler).unwrap();
//!
//! menu.append("<li>Contact</li>").unwrap();
//! doc.select("li").unwrap().last().trigger("click");
//!
//! assert_eq!(clicks.get(), 1);
//! assert_eq!(menu.find("li").unwrap().len(), 3);
//! ```
//!
//! ## Loading
//!
//! Documents are ready as soon as they are parsed. With
//! [`DocumentOptions::defer_ready`] they stay loading until
//! [`Document::finish_loading`], and [`Document::ready`] callbacks wait:
//!
//! ```
//! use littledom::{Document, DocumentOptions, ReadyState};
//!
//! let doc = Document::parse_with("<p>hi</p>", DocumentOptions::new().with_defer_ready(true));
//! doc.ready(|| println!("ready"));
//! assert_eq!(doc.ready_state(), ReadyState::Loading);
//!
//! doc.finish_loading();
//! assert_eq!(doc.ready_state(), ReadyState::Complete);
//! ```

pub mod dom;
mod error;
pub mod event;
pub mod selection;
pub(crate) mod util;

pub use dom::{Document, DocumentOptions, Node, NodeType, ReadyState, WeakNode};
pub use error::{Error, Result};
pub use event::{Event, EventInit, Handler};
pub use selection::{Content, Query, Selection};
