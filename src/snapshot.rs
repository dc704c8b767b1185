//! Style snapshot providers – capture the style rules of the live page as
//! one text blob for the exported document.
//!
//! The live page's utility classes were generated at build time and exist
//! only in its stylesheets, so the export serializes those rules instead of
//! trying to recompute them.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::dom::{ElementNode, Node, Tag};

/// Source of the live page's stylesheet text.
pub trait StyleSnapshot {
    fn capture(&self) -> String;
}

/// A fixed stylesheet, injected by tests and FFI callers.
#[derive(Debug, Clone, Default)]
pub struct FixedStyles(pub String);

impl FixedStyles {
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }
}

impl StyleSnapshot for FixedStyles {
    fn capture(&self) -> String {
        self.0.clone()
    }
}

/// Styles reachable from a page snapshot: inline `<style>` blocks and local
/// `<link rel="stylesheet">` files, in document order, plus extra files.
#[derive(Debug, Clone, Default)]
pub struct PageStyles {
    sources: Vec<StyleSource>,
    base_dir: Option<PathBuf>,
    extra: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum StyleSource {
    Inline(String),
    Linked(String),
}

impl PageStyles {
    /// Collect the style sources of a parsed page. Relative links resolve
    /// against `base_dir`.
    pub fn from_page(nodes: &[Node], base_dir: Option<&Path>) -> Self {
        let mut sources = Vec::new();
        for node in nodes {
            if let Node::Element(e) = node {
                collect_sources(e, &mut sources);
            }
        }
        Self {
            sources,
            base_dir: base_dir.map(Path::to_path_buf),
            extra: Vec::new(),
        }
    }

    /// Append a stylesheet file after the page's own rules.
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra.push(path.into());
        self
    }

    fn read_linked(&self, href: &str) -> Option<String> {
        let lower = href.to_ascii_lowercase();
        if lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("//") {
            debug!("Skipping cross-origin stylesheet {href}");
            return None;
        }
        let rel = href.trim_start_matches("file://");
        let rel = rel.split(['?', '#']).next().unwrap_or(rel);
        let path = match &self.base_dir {
            Some(dir) => dir.join(rel.trim_start_matches('/')),
            None => PathBuf::from(rel),
        };
        read_css(&path)
    }
}

fn read_css(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(css) => Some(css),
        Err(e) => {
            debug!("Skipping unreadable stylesheet {}: {e}", path.display());
            None
        }
    }
}

fn collect_sources(el: &ElementNode, out: &mut Vec<StyleSource>) {
    match el.tag {
        Tag::Style => {
            let css: String = el
                .children
                .iter()
                .filter_map(|c| match c {
                    Node::Text(t) => Some(t.as_str()),
                    Node::Element(_) => None,
                })
                .collect();
            if !css.trim().is_empty() {
                out.push(StyleSource::Inline(css));
            }
        }
        Tag::Link => {
            let is_stylesheet = el.attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("stylesheet"))
            });
            if let (true, Some(href)) = (is_stylesheet, el.attr("href")) {
                out.push(StyleSource::Linked(href.to_string()));
            }
        }
        _ => {
            for child in el.element_children() {
                collect_sources(child, out);
            }
        }
    }
}

impl StyleSnapshot for PageStyles {
    fn capture(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();
        for source in &self.sources {
            match source {
                StyleSource::Inline(css) => blocks.push(css.trim().to_string()),
                StyleSource::Linked(href) => blocks.extend(self.read_linked(href)),
            }
        }
        blocks.extend(self.extra.iter().filter_map(|p| read_css(p)));
        blocks.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn fixed_styles_are_returned_verbatim() {
        assert_eq!(FixedStyles::new(".a{}").capture(), ".a{}");
    }

    #[test]
    fn collects_inline_blocks_and_skips_remote_links() {
        let page = parse_html(
            r#"<html><head><style>.a { color: red; }</style><link rel="stylesheet" href="https://cdn.example.com/x.css"><link rel="icon" href="fav.ico"></head><body><style>.b { color: blue; }</style></body></html>"#,
        );
        let css = PageStyles::from_page(&page, None).capture();
        assert_eq!(css, ".a { color: red; }\n.b { color: blue; }");
    }

    #[test]
    fn reads_local_linked_and_extra_stylesheets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), ".linked { margin: 0; }").unwrap();
        std::fs::write(dir.path().join("extra.css"), ".extra { padding: 0; }").unwrap();
        let page = parse_html(
            r#"<head><link rel="stylesheet" href="/app.css?v=3"><link rel="stylesheet" href="missing.css"></head>"#,
        );
        let css = PageStyles::from_page(&page, Some(dir.path()))
            .with_stylesheet(dir.path().join("extra.css"))
            .capture();
        assert_eq!(css, ".linked { margin: 0; }\n.extra { padding: 0; }");
    }
}
