//! Inline style declarations and a small cascade for computed values.
//!
//! Values are kept as the author wrote them (trimmed); nothing is converted
//! to used or resolved values, so `color: red` computes to `"red"`.

use std::cmp::Ordering;
use std::rc::Rc;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::arena::{NodeArena, NodeId};
use super::element_ref::{DomSelectors, ElementRef};

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    fn to_css(&self) -> String {
        if self.important {
            format!("{}: {} !important;", self.property, self.value)
        } else {
            format!("{}: {};", self.property, self.value)
        }
    }
}

/// The declarations of a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Parse a declaration list such as `"color: red; display:none"`.
    ///
    /// Later duplicates replace earlier ones; malformed declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let mut style = InlineStyle::default();
        for decl in parse_declarations(css) {
            style.put(decl);
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = property.to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Set one property. An empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            self.remove(&property);
            return;
        }
        let (value, important) = split_important(value);
        self.put(Declaration {
            property,
            value: value.to_string(),
            important,
        });
    }

    pub fn remove(&mut self, property: &str) {
        let property = property.to_ascii_lowercase();
        self.declarations.retain(|d| d.property != property);
    }

    /// Append raw declaration text, as `style.cssText += text` does.
    pub fn append_css_text(&mut self, css: &str) {
        for decl in parse_declarations(css) {
            self.put(decl);
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize as `style` attribute text: `"color: red; display: none;"`.
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(Declaration::to_css)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn put(&mut self, decl: Declaration) {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.property == decl.property)
        {
            Some(existing) => *existing = decl,
            None => self.declarations.push(decl),
        }
    }
}

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// A style rule with its selectors and declarations.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector<DomSelectors>>,
    pub declarations: Vec<Declaration>,
}

/// CSS specificity for cascade ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    pub fn from_selector(selector: &Selector<DomSelectors>) -> Self {
        let spec = selector.specificity();
        // selectors packs specificity as (id << 20) | (class << 10) | elements
        Self {
            ids: ((spec >> 20) & 0x3FF) as u16,
            classes: ((spec >> 10) & 0x3FF) as u16,
            elements: (spec & 0x3FF) as u16,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Origin of a style (for cascade ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent = 0,
    Author = 1,
    /// The element's own `style` attribute.
    Inline = 2,
}

impl Stylesheet {
    /// Parse a stylesheet. At-rules and invalid rules are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            // Lenient, like a browser.
            let _ = result;
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<DomSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let location = input.current_source_location();
        SelectorList::parse(&DomSelectors, input, ParseRelative::No)
            .map(|list| list.slice().to_vec())
            .map_err(|_| location.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        self.rules.push(CssRule {
            selectors: prelude,
            declarations,
        });
        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important(input.slice_from(start));
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }

        self.declarations.push(Declaration {
            property: name.to_ascii_lowercase(),
            value: value.to_string(),
            important,
        });
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

fn parse_declarations(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        let _ = result;
    }
    declarations
}

/// Strip a trailing `!important`, returning the trimmed value and the flag.
fn split_important(raw: &str) -> (&str, bool) {
    let value = raw.trim();
    let len = value.len();
    if len >= "important".len() {
        let (head, tail) = value.split_at(len - "important".len());
        if tail.eq_ignore_ascii_case("important")
            && let Some(head) = head.trim_end().strip_suffix('!')
        {
            return (head.trim_end(), true);
        }
    }
    (value, false)
}

const USER_AGENT_CSS: &str = r#"
    html, body, div, section, article, aside, nav, header, footer, main,
    address, blockquote, figure, figcaption, details, form, fieldset,
    h1, h2, h3, h4, h5, h6, p, pre, hr, dl, dd, dt, ul, ol, menu {
        display: block;
    }
    head, script, style, link, meta, title, template, noscript { display: none; }
    li { display: list-item; }
    table { display: table; }
    caption { display: table-caption; }
    thead { display: table-header-group; }
    tbody { display: table-row-group; }
    tfoot { display: table-footer-group; }
    tr { display: table-row; }
    td, th { display: table-cell; }
    h1, h2, h3, h4, h5, h6, b, strong, th { font-weight: bold; }
    i, em, cite, var, dfn { font-style: italic; }
    pre, code, kbd, samp, tt { font-family: monospace; }
    u, ins { text-decoration: underline; }
    s, del, strike { text-decoration: line-through; }
    a:link { color: blue; text-decoration: underline; }
    [hidden] { display: none; }
"#;

thread_local! {
    static USER_AGENT: Rc<Stylesheet> = Rc::new(Stylesheet::parse(USER_AGENT_CSS));
}

/// The built-in user-agent stylesheet.
pub fn user_agent_stylesheet() -> Rc<Stylesheet> {
    USER_AGENT.with(Rc::clone)
}

/// Properties whose value flows from parent to child when unset.
fn is_inherited(property: &str) -> bool {
    matches!(
        property,
        "color"
            | "cursor"
            | "direction"
            | "font"
            | "font-family"
            | "font-size"
            | "font-style"
            | "font-variant"
            | "font-weight"
            | "letter-spacing"
            | "line-height"
            | "list-style"
            | "list-style-type"
            | "quotes"
            | "text-align"
            | "text-indent"
            | "text-transform"
            | "visibility"
            | "white-space"
            | "word-spacing"
    )
}

fn initial_value(property: &str) -> Option<&'static str> {
    let value = match property {
        "display" => "inline",
        "color" => "black",
        "visibility" => "visible",
        "position" => "static",
        "float" => "none",
        "font-style" => "normal",
        "font-weight" => "normal",
        "font-variant" => "normal",
        "text-align" => "start",
        "text-decoration" => "none",
        "text-transform" => "none",
        "white-space" => "normal",
        "opacity" => "1",
        "background-color" => "transparent",
        "width" | "height" => "auto",
        "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => "0px",
        "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => "0px",
        _ => return None,
    };
    Some(value)
}

/// Stylesheets that apply to a document: the user-agent sheet followed by
/// every `<style>` element in document order.
pub fn document_stylesheets(arena: &NodeArena) -> Vec<(Rc<Stylesheet>, Origin)> {
    let mut sheets = vec![(user_agent_stylesheet(), Origin::UserAgent)];
    for id in arena.descendants(arena.document()) {
        if arena.element_name(id).is_some_and(|name| name.as_ref() == "style") {
            let sheet = Stylesheet::parse(&arena.text_content(id));
            if !sheet.is_empty() {
                sheets.push((Rc::new(sheet), Origin::Author));
            }
        }
    }
    sheets
}

/// A matched declaration with ordering information for the cascade.
struct MatchedDeclaration<'a> {
    declaration: &'a Declaration,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl MatchedDeclaration<'_> {
    fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.declaration
            .important
            .cmp(&other.declaration.important)
            .then(self.origin.cmp(&other.origin))
            .then(self.specificity.cmp(&other.specificity))
            .then(self.order.cmp(&other.order))
    }
}

/// The value that wins the cascade for one property on one element, before
/// inheritance. Inline style counts as the most specific author origin.
fn cascaded_value(
    arena: &NodeArena,
    id: NodeId,
    property: &str,
    sheets: &[(Rc<Stylesheet>, Origin)],
) -> Option<String> {
    let element = ElementRef::new(arena, id);
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );

    let mut matched: Vec<MatchedDeclaration> = Vec::new();
    let mut order = 0;
    for (sheet, origin) in sheets {
        for rule in &sheet.rules {
            let specificity = rule
                .selectors
                .iter()
                .filter(|&selector| {
                    selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
                })
                .map(Specificity::from_selector)
                .max();
            let Some(specificity) = specificity else {
                continue;
            };
            for declaration in rule.declarations.iter().filter(|d| d.property == property) {
                matched.push(MatchedDeclaration {
                    declaration,
                    origin: *origin,
                    specificity,
                    order,
                });
                order += 1;
            }
        }
    }

    let inline = arena.get_attr(id, "style").map(InlineStyle::parse);
    if let Some(inline) = &inline {
        for declaration in inline.declarations().iter().filter(|d| d.property == property) {
            matched.push(MatchedDeclaration {
                declaration,
                origin: Origin::Inline,
                specificity: Specificity::default(),
                order,
            });
            order += 1;
        }
    }

    matched
        .into_iter()
        .max_by(|a, b| a.cascade_cmp(b))
        .map(|m| m.declaration.value.clone())
}

/// Computed value of `property` for an element, resolving `inherit`,
/// `initial` and inherited properties through the parent chain.
pub fn computed_value(
    arena: &NodeArena,
    id: NodeId,
    property: &str,
    sheets: &[(Rc<Stylesheet>, Origin)],
) -> Option<String> {
    if !arena.is_element(id) {
        return None;
    }
    let property = property.to_ascii_lowercase();
    let from_parent = || match arena.parent_element(id) {
        Some(parent) => computed_value(arena, parent, &property, sheets),
        None => initial_value(&property).map(str::to_string),
    };

    match cascaded_value(arena, id, &property, sheets).as_deref() {
        Some("inherit") => from_parent(),
        Some("initial") => initial_value(&property).map(str::to_string),
        Some("unset") | None if is_inherited(&property) => from_parent(),
        Some("unset") | None => initial_value(&property).map(str::to_string),
        Some(value) => Some(value.to_string()),
    }
}
