//! Content sanitizer – removes editor-only affordances from a cloned preview
//! subtree: add buttons, delete controls, hover-revealed tools, placeholder
//! list items and contact rows that carry no real value.
//!
//! The pass is structural. It looks at tags, attributes, classes and text and
//! never at the style profile. Children are sanitized before their parent is
//! judged, so a single post-order pass reaches the fixed point and running it
//! again changes nothing.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Serialize;
use url::{ParseError, Url};

use crate::dom::{ElementNode, Node, Tag};

/// Selectors hidden by the stylesheet as a second line of defence behind the
/// sanitizer.
pub const AFFORDANCE_SELECTORS: &[&str] = &[
    "[data-add-button]",
    "[data-action=\"add\"]",
    "[data-action=\"delete\"]",
    "[data-action=\"remove\"]",
    ".add-item",
    ".add-button",
    ".delete-button",
    ".remove-button",
    "button[aria-label^=\"Add\"]",
    "button[aria-label^=\"Delete\"]",
    "button[aria-label^=\"Remove\"]",
    ".opacity-0[class*=\"hover:opacity\"]",
    ".opacity-0[class*=\"hover/\"]",
];

/// Placeholder shown by empty inline-edit fields.
pub const EDIT_PLACEHOLDER: &str = "Click to edit";
const ADD_PLACEHOLDER_PREFIX: &str = "click to add";
/// List items with fewer characters than this are treated as empty.
const MIN_ITEM_CHARS: usize = 3;

static ADD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\+?\s*add\b").expect("add-label pattern"));
static DELETE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(delete|remove|trash)\b").expect("delete-label pattern"));

/// Why a node was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    AddAffordance,
    DeleteControl,
    HoverOnly,
    PlaceholderItem,
    EmptyContactRow,
}

/// Per-rule removal counts for one sanitize pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub add_affordances: usize,
    pub delete_controls: usize,
    pub hover_only: usize,
    pub placeholder_items: usize,
    pub empty_contact_rows: usize,
}

impl SanitizeReport {
    pub fn total(&self) -> usize {
        self.add_affordances
            + self.delete_controls
            + self.hover_only
            + self.placeholder_items
            + self.empty_contact_rows
    }

    fn record(&mut self, rule: Rule) {
        match rule {
            Rule::AddAffordance => self.add_affordances += 1,
            Rule::DeleteControl => self.delete_controls += 1,
            Rule::HoverOnly => self.hover_only += 1,
            Rule::PlaceholderItem => self.placeholder_items += 1,
            Rule::EmptyContactRow => self.empty_contact_rows += 1,
        }
    }
}

/// Strip editor affordances below `root`. The root itself is never removed.
pub fn sanitize(root: &mut ElementNode) -> SanitizeReport {
    let mut report = SanitizeReport::default();
    sanitize_children(root, &mut report);
    if report.total() > 0 {
        debug!("Sanitizer removed {} nodes: {report:?}", report.total());
    }
    report
}

fn sanitize_children(el: &mut ElementNode, report: &mut SanitizeReport) {
    // svg internals carry no editor affordances
    if matches!(el.tag, Tag::Svg) {
        return;
    }
    for child in el.element_children_mut() {
        sanitize_children(child, report);
    }
    el.children.retain(|child| match child {
        Node::Element(e) => match removal_rule(e) {
            Some(rule) => {
                report.record(rule);
                false
            }
            None => true,
        },
        Node::Text(_) => true,
    });
}

/// The first rule matching an element, if any.
pub fn removal_rule(el: &ElementNode) -> Option<Rule> {
    if is_add_affordance(el) {
        Some(Rule::AddAffordance)
    } else if is_delete_control(el) {
        Some(Rule::DeleteControl)
    } else if is_hover_only(el) {
        Some(Rule::HoverOnly)
    } else if is_placeholder_item(el) {
        Some(Rule::PlaceholderItem)
    } else if is_empty_contact_row(el) {
        Some(Rule::EmptyContactRow)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn is_interactive(el: &ElementNode) -> bool {
    matches!(el.tag, Tag::Button)
        || el
            .attr("role")
            .is_some_and(|r| r.eq_ignore_ascii_case("button"))
}

fn action_is(el: &ElementNode, actions: &[&str]) -> bool {
    el.attr("data-action")
        .is_some_and(|a| actions.iter().any(|x| a.trim().eq_ignore_ascii_case(x)))
}

/// Accessible label of a control: aria-label, then title, then its text.
fn label(el: &ElementNode) -> String {
    el.attr("aria-label")
        .or_else(|| el.attr("title"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| normalize_ws(&el.text_content()))
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// No block structure below: only text, inline wrappers and icons.
fn is_inline_only(el: &ElementNode) -> bool {
    el.element_children().all(|c| {
        c.find(|d| {
            d.tag.is_container()
                || matches!(
                    d.tag,
                    Tag::Ul | Tag::Ol | Tag::Li | Tag::P | Tag::H1 | Tag::H2 | Tag::H3
                )
        })
        .is_none()
    })
}

fn is_add_affordance(el: &ElementNode) -> bool {
    if el.has_attr("data-add-button")
        || action_is(el, &["add"])
        || el.has_class("add-item")
        || el.has_class("add-button")
    {
        return true;
    }
    if is_interactive(el) || el.has_class("cursor-pointer") {
        return ADD_LABEL.is_match(&label(el));
    }
    // "+ Add ..." rendered as a plain clickable text block
    let text = normalize_ws(&el.text_content());
    text.starts_with('+') && ADD_LABEL.is_match(&text) && is_inline_only(el)
}

const DELETE_ICONS: &[&str] = &["lucide-trash", "lucide-trash-2", "lucide-x", "lucide-minus"];

fn is_delete_control(el: &ElementNode) -> bool {
    if action_is(el, &["delete", "remove"])
        || el.has_class("delete-button")
        || el.has_class("remove-button")
    {
        return true;
    }
    if !is_interactive(el) {
        return false;
    }
    let labelled = el
        .attr("aria-label")
        .or_else(|| el.attr("title"))
        .is_some_and(|l| DELETE_LABEL.is_match(l));
    let icon_only = el.text_content().trim().is_empty()
        && el
            .find(|d| {
                matches!(d.tag, Tag::Svg) && DELETE_ICONS.iter().any(|icon| d.has_class(icon))
            })
            .is_some();
    labelled || icon_only
}

fn is_hover_only(el: &ElementNode) -> bool {
    let classes = el.classes();
    let hidden = classes.iter().any(|c| *c == "opacity-0" || *c == "invisible");
    let revealed_on_hover = classes.iter().any(|c| {
        let (variant, utility) = match c.rsplit_once(':') {
            Some(parts) => parts,
            None => return false,
        };
        variant.contains("hover") && (utility.starts_with("opacity-") || utility == "visible")
    });
    hidden && revealed_on_hover
}

fn is_placeholder_item(el: &ElementNode) -> bool {
    if !matches!(el.tag, Tag::Li) {
        return false;
    }
    let text = normalize_ws(&el.text_content());
    text.chars().count() < MIN_ITEM_CHARS
        || text.to_lowercase().starts_with(ADD_PLACEHOLDER_PREFIX)
}

/// A value carried by a contact row.
#[derive(Debug, PartialEq)]
enum ContactValue {
    Text(String),
    Link(String),
}

impl ContactValue {
    fn is_blank(&self) -> bool {
        match self {
            ContactValue::Text(t) => t.is_empty() || t.eq_ignore_ascii_case(EDIT_PLACEHOLDER),
            ContactValue::Link(u) => !is_valid_link(u),
        }
    }
}

fn is_icon(el: &ElementNode) -> bool {
    matches!(el.tag, Tag::Svg | Tag::Img)
}

/// An icon followed by one or more values, e.g. `<div><svg/><span>me@x.io</span></div>`.
fn contact_values(el: &ElementNode) -> Option<Vec<ContactValue>> {
    if matches!(el.tag, Tag::Svg | Tag::Button) {
        return None;
    }
    let first = el.element_children().next()?;
    if !is_icon(first) {
        // <a href> wrapping an icon row
        if matches!(el.tag, Tag::A) && el.element_children().count() == 1 {
            let values = contact_values(first)?;
            return Some(anchor_value(el).map(|v| vec![v]).unwrap_or(values));
        }
        return None;
    }

    let mut values = Vec::new();
    let mut seen_icon = false;
    for child in &el.children {
        match child {
            Node::Element(e) if !seen_icon && is_icon(e) => seen_icon = true,
            Node::Element(e) => values.push(element_value(e)),
            Node::Text(t) if !t.trim().is_empty() => values.push(text_value(t)),
            Node::Text(_) => {}
        }
    }
    if values.is_empty() {
        return None;
    }
    Some(anchor_value(el).map(|v| vec![v]).unwrap_or(values))
}

/// The target of a link; its visible text is only a label.
fn anchor_value(e: &ElementNode) -> Option<ContactValue> {
    match e.tag {
        Tag::A => e.attr("href").map(|h| ContactValue::Link(h.trim().to_string())),
        _ => None,
    }
}

fn element_value(e: &ElementNode) -> ContactValue {
    anchor_value(e).unwrap_or_else(|| text_value(&e.text_content()))
}

fn text_value(t: &str) -> ContactValue {
    let t = normalize_ws(t);
    let lower = t.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.") {
        ContactValue::Link(t)
    } else {
        ContactValue::Text(t)
    }
}

fn is_empty_contact_row(el: &ElementNode) -> bool {
    contact_values(el)
        .map(|values| values.iter().all(ContactValue::is_blank))
        .unwrap_or(false)
}

/// A link is usable when it has a scheme and a host (or, for `mailto:` and
/// `tel:`, a non-empty target). Scheme-less values such as
/// `linkedin.com/in/jane` count when they look like a host.
pub fn is_valid_link(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') || raw.starts_with('/') {
        return false;
    }
    match Url::parse(raw) {
        Ok(url) => is_usable_url(&url),
        Err(ParseError::RelativeUrlWithoutBase) if looks_like_host(raw) => {
            Url::parse(&format!("https://{raw}"))
                .is_ok_and(|url| url.host_str().is_some_and(|h| h.contains('.')))
        }
        Err(_) => false,
    }
}

fn is_usable_url(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => url.host_str().is_some_and(|h| !h.is_empty()),
        "mailto" | "tel" => !url.path().trim().is_empty(),
        _ => false,
    }
}

/// `host.tld[/path]` without whitespace.
fn looks_like_host(raw: &str) -> bool {
    let host = raw.split(['/', '?', '#']).next().unwrap_or_default();
    !raw.chars().any(char::is_whitespace)
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
}
