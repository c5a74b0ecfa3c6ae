//! Selector parsing and `querySelectorAll`-style lookups.

use cssparser::{Parser, ParserInput};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};
use selectors::parser::{ParseRelative, SelectorList};

use super::arena::{NodeArena, NodeId};
use super::element_ref::{DomSelectors, ElementRef};
use crate::error::{Error, Result};

/// A parsed, reusable selector group such as `"ul > li.last, h6"`.
pub type Selectors = SelectorList<DomSelectors>;

/// Parse a selector group. Syntax errors surface as [`Error::InvalidSelector`].
pub fn parse_selectors(selector: &str) -> Result<Selectors> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    SelectorList::parse(&DomSelectors, &mut parser, ParseRelative::No).map_err(|err| {
        Error::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", err.kind),
        }
    })
}

/// True if the element matches any selector of the group.
pub fn matches(arena: &NodeArena, id: NodeId, selectors: &Selectors) -> bool {
    if !arena.is_element(id) {
        return false;
    }
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );
    let element = ElementRef::new(arena, id);
    selectors.slice().iter().any(|selector| {
        selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
    })
}

/// All elements strictly below `scope` matching the group, in document order.
///
/// Like the DOM's `querySelectorAll`, ancestors outside the scope still take
/// part in matching combinators: `div p` scoped to a `<p>`'s parent section
/// matches when the `div` sits above the section.
pub fn select_all(arena: &NodeArena, scope: NodeId, selectors: &Selectors) -> Vec<NodeId> {
    if !arena.is_container(scope) {
        return Vec::new();
    }
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );
    arena
        .descendants(scope)
        .filter(|&id| arena.is_element(id))
        .filter(|&id| {
            let element = ElementRef::new(arena, id);
            selectors.slice().iter().any(|selector| {
                selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
            })
        })
        .collect()
}
