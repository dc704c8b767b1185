//! HTML snapshot parser – converts a serialized editor page into a small DOM
//! tree that the sanitizer and normalizer mutate in place, and serializes it
//! back to markup.
//!
//! The input is whatever the live preview rendered, so unlike a template
//! parser we accept arbitrary tags:
//! - Void elements (`br`, `img`, `input`, ...) never take children
//! - Raw-text elements (`style`, `script`, `textarea`) keep their body verbatim
//! - SVG self-closing tags (`<path ... />`) are honoured
//! - Tag and attribute names keep their original case (`viewBox`,
//!   `linearGradient`) but are matched case-insensitively

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Html,
    Head,
    Body,
    Div,
    Span,
    P,
    H1,
    H2,
    H3,
    Ul,
    Ol,
    Li,
    A,
    Button,
    Img,
    Svg,
    Input,
    Textarea,
    Style,
    Script,
    Noscript,
    Link,
    Meta,
    Br,
    Hr,
    /// Any other element, with its original spelling.
    Other(String),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that can act as a layout column.
const CONTAINER_ELEMENTS: &[&str] = &["div", "section", "aside", "main", "article", "nav"];

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "html" => Tag::Html,
            "head" => Tag::Head,
            "body" => Tag::Body,
            "div" => Tag::Div,
            "span" => Tag::Span,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "a" => Tag::A,
            "button" => Tag::Button,
            "img" => Tag::Img,
            "svg" => Tag::Svg,
            "input" => Tag::Input,
            "textarea" => Tag::Textarea,
            "style" => Tag::Style,
            "script" => Tag::Script,
            "noscript" => Tag::Noscript,
            "link" => Tag::Link,
            "meta" => Tag::Meta,
            "br" => Tag::Br,
            "hr" => Tag::Hr,
            _ => Tag::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Html => "html",
            Tag::Head => "head",
            Tag::Body => "body",
            Tag::Div => "div",
            Tag::Span => "span",
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::A => "a",
            Tag::Button => "button",
            Tag::Img => "img",
            Tag::Svg => "svg",
            Tag::Input => "input",
            Tag::Textarea => "textarea",
            Tag::Style => "style",
            Tag::Script => "script",
            Tag::Noscript => "noscript",
            Tag::Link => "link",
            Tag::Meta => "meta",
            Tag::Br => "br",
            Tag::Hr => "hr",
            Tag::Other(name) => name,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.iter().any(|v| self.is(v))
    }

    pub fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Style | Tag::Script | Tag::Textarea)
    }

    /// Block-level containers that may form a column of a flex row.
    pub fn is_container(&self) -> bool {
        CONTAINER_ELEMENTS.iter().any(|c| self.is(c))
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes (in source order), and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self
            .attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(idx).1)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|x| x == class))
            .unwrap_or(false)
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attr("style")
    }

    /// Concatenated text of all descendants, ignoring `style`/`script` bodies.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn element_children_mut(&mut self) -> impl Iterator<Item = &mut ElementNode> {
        self.children.iter_mut().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Pre-order search over this element and its descendants.
    pub fn find<F>(&self, pred: F) -> Option<&ElementNode>
    where
        F: Fn(&ElementNode) -> bool + Copy,
    {
        if pred(self) {
            return Some(self);
        }
        self.element_children().find_map(|c| c.find(pred))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ElementNode> {
        self.find(|e| e.id() == Some(id))
    }

    /// Follow a path of element-child indices (text nodes are not counted).
    pub fn descend(&self, path: &[usize]) -> Option<&ElementNode> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.element_children().nth(i)?.descend(rest),
        }
    }

    pub fn descend_mut(&mut self, path: &[usize]) -> Option<&mut ElementNode> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.element_children_mut().nth(i)?.descend_mut(rest),
        }
    }

    /// Serialize with default options (scripts kept).
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        serialize_element(self, &SerializeOptions::default(), &mut out);
        out
    }
}

fn collect_text(el: &ElementNode, out: &mut String) {
    if matches!(el.tag, Tag::Style | Tag::Script) {
        return;
    }
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

/// Depth-first search for an element by `id` across a node list.
pub fn find_by_id<'a>(nodes: &'a [Node], id: &str) -> Option<&'a ElementNode> {
    nodes.iter().find_map(|n| match n {
        Node::Element(e) => e.find_by_id(id),
        Node::Text(_) => None,
    })
}

// ---------------------------------------------------------------------------
// Parser – recursive descent over forgiving HTML
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of DOM nodes.
///
/// Comments, doctypes and processing instructions are dropped. A closing tag
/// that matches no open element is skipped; one that matches an ancestor
/// implicitly closes everything opened since.
pub fn parse_html(html: &str) -> Vec<Node> {
    let mut parser = Parser::new(html);
    let mut nodes = Vec::new();
    loop {
        nodes.extend(parser.parse_nodes());
        if parser.eof() {
            break;
        }
        // Stray closing tag at top level.
        parser.skip_closing_tag();
    }
    nodes
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Lower-cased names of the currently open elements.
    open: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
        }
    }

    fn parse_nodes(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        while !self.eof() {
            if self.starts_with("</") {
                let name = self.peek_closing_name();
                if self.open.iter().any(|o| *o == name) {
                    break;
                }
                self.skip_closing_tag();
                continue;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<Node> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            self.skip_past('>');
            return None;
        }
        if self.starts_with("<") && self.next_is_name_start() {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> Node {
        let start = self.pos;
        // A lone '<' that does not open a tag is literal text.
        if self.starts_with("<") {
            self.advance(1);
        }
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        Node::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> Node {
        self.advance(1); // '<'
        let tag_name = self.parse_name();
        let tag = Tag::from_name(&tag_name);
        let mut elem = ElementNode::new(tag);

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            match self.parse_attribute() {
                Some((key, value)) => {
                    if !elem.has_attr(&key) {
                        elem.attributes.push((key, value));
                    }
                }
                None => self.advance(1),
            }
        }

        if self.starts_with("/>") {
            self.advance(2);
            return Node::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if elem.tag.is_void() {
            return Node::Element(elem);
        }

        let lower = tag_name.to_ascii_lowercase();
        if elem.tag.is_raw_text() {
            let body = self.take_raw_text(&lower);
            if !body.is_empty() {
                let text = if elem.tag == Tag::Textarea {
                    decode_entities(&body)
                } else {
                    body
                };
                elem.children.push(Node::Text(text));
            }
            self.skip_closing_tag();
            return Node::Element(elem);
        }

        self.open.push(lower.clone());
        elem.children = self.parse_nodes();
        self.open.pop();

        if self.starts_with("</") && self.peek_closing_name() == lower {
            self.skip_closing_tag();
        }
        Node::Element(elem)
    }

    fn take_raw_text(&mut self, name: &str) -> String {
        let closing = format!("</{name}");
        let rest = &self.input[self.pos..];
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        let body = rest[..end].to_string();
        self.pos += end;
        body
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.' | '@') {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> Option<(String, String)> {
        let key = self.parse_name();
        if key.is_empty() {
            return None;
        }
        self.skip_whitespace();
        if !self.starts_with("=") {
            return Some((key, String::new()));
        }
        self.advance(1); // '='
        self.skip_whitespace();
        Some((key, self.parse_attr_value()))
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ["\"", "'"] {
            if self.starts_with(quote) {
                self.advance(1);
                let start = self.pos;
                while !self.eof() && !self.starts_with(quote) {
                    self.advance(1);
                }
                let val = decode_entities(&self.input[start..self.pos]);
                if !self.eof() {
                    self.advance(1);
                }
                return val;
            }
        }
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_whitespace() || c == '>' {
                break;
            }
            if c == '/' && self.input[self.pos..].starts_with("/>") {
                break;
            }
            self.advance(1);
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn peek_closing_name(&self) -> String {
        self.input[self.pos + 2..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect::<String>()
            .to_ascii_lowercase()
    }

    fn skip_closing_tag(&mut self) {
        self.skip_past('>');
    }

    fn skip_past(&mut self, c: char) {
        match self.input[self.pos..].find(c) {
            Some(i) => self.pos += i + c.len_utf8(),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.current_char().is_whitespace() {
            self.advance(1);
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4); // <!--
        match self.input[self.pos..].find("-->") {
            Some(i) => self.pos += i + 3,
            None => self.pos = self.input.len(),
        }
    }

    fn next_is_name_start(&self) -> bool {
        self.input[self.pos..]
            .chars()
            .nth(1)
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, n: usize) {
        // Advance by `n` characters (not bytes).
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '\u{00A9}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        _ => return None,
    };
    Some(c)
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

/// Options controlling serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Drop `<script>`/`<noscript>` elements, `on*` handler attributes and
    /// `javascript:` URLs.
    pub strip_scripts: bool,
}

pub fn serialize_nodes(nodes: &[Node], opts: &SerializeOptions, out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(e) => serialize_element(e, opts, out),
            Node::Text(t) => escape_text(t, out),
        }
    }
}

pub fn serialize_element(el: &ElementNode, opts: &SerializeOptions, out: &mut String) {
    if opts.strip_scripts && matches!(el.tag, Tag::Script | Tag::Noscript) {
        return;
    }

    out.push('<');
    out.push_str(el.tag.as_str());
    for (name, value) in &el.attributes {
        if opts.strip_scripts && is_script_attribute(name, value) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    out.push('>');

    if el.tag.is_void() {
        return;
    }

    if matches!(el.tag, Tag::Style | Tag::Script) {
        for child in &el.children {
            if let Node::Text(t) = child {
                out.push_str(t);
            }
        }
    } else {
        serialize_nodes(&el.children, opts, out);
    }

    out.push_str("</");
    out.push_str(el.tag.as_str());
    out.push('>');
}

fn is_script_attribute(name: &str, value: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("on") {
        return true;
    }
    let v: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    v.starts_with("javascript:")
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
