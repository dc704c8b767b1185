//! Document assembler – wraps the sanitized, normalized tree into one
//! self-contained HTML document for the rendering service.
//!
//! Style blocks are emitted so later rules win: live page styles, then the
//! profile's variables and base rules, then the hard print overrides.
//! No script content ever reaches the output.

use crate::dom::{serialize_element, ElementNode, SerializeOptions};
use crate::profile::{to_base_stylesheet, to_variables, PageGeometry, StyleProfile};
use crate::sanitize::AFFORDANCE_SELECTORS;

/// The style inputs of one document.
#[derive(Debug, Clone)]
pub struct DocumentStyles {
    pub live_styles: String,
    pub variables: String,
    pub base_stylesheet: String,
    pub font_link: Option<String>,
    pub page: PageGeometry,
}

impl DocumentStyles {
    pub fn from_profile(
        profile: &StyleProfile,
        theme_color: Option<&str>,
        live_styles: impl Into<String>,
    ) -> Self {
        Self {
            live_styles: live_styles.into(),
            variables: to_variables(profile, theme_color),
            base_stylesheet: to_base_stylesheet(profile),
            font_link: profile.font_link.clone(),
            page: profile.page.clone(),
        }
    }
}

/// Rules that must win over everything captured from the page.
pub fn hard_overrides(page: &PageGeometry) -> String {
    format!(
        "* {{ -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }}\n\
         html, body {{ width: {w}mm; min-height: {h}mm; margin: 0 !important; padding: 0 !important; }}\n\
         @page {{ size: {w}mm {h}mm; margin: 0; }}\n\
         {selectors} {{ display: none !important; }}",
        w = page.width_mm,
        h = page.height_mm,
        selectors = AFFORDANCE_SELECTORS.join(", "),
    )
}

/// Keep style text from closing its `<style>` element. `\3c ` is the CSS
/// escape for `<`.
fn escape_css(css: &str) -> String {
    css.replace('<', "\\3c ")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build the complete document.
pub fn assemble(tree: &ElementNode, styles: &DocumentStyles) -> String {
    let mut html = String::with_capacity(styles.live_styles.len() + 8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    if let Some(link) = &styles.font_link {
        html.push_str(&format!(
            "<link href=\"{}\" rel=\"stylesheet\">\n",
            escape_attr(link)
        ));
    }

    let mut style_block = |origin: &str, css: &str| {
        html.push_str(&format!(
            "<style data-origin=\"{origin}\">\n{}\n</style>\n",
            escape_css(css)
        ));
    };
    if !styles.live_styles.trim().is_empty() {
        style_block("live", &styles.live_styles);
    }
    style_block(
        "profile",
        &format!("{}\n{}", styles.variables, styles.base_stylesheet),
    );
    style_block("overrides", &hard_overrides(&styles.page));

    html.push_str("</head>\n<body>\n");
    serialize_element(tree, &SerializeOptions { strip_scripts: true }, &mut html);
    html.push_str("\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, Node};

    fn tree(html: &str) -> ElementNode {
        match parse_html(html).into_iter().next() {
            Some(Node::Element(e)) => e,
            _ => panic!("Expected element"),
        }
    }

    fn styles(live: &str) -> DocumentStyles {
        DocumentStyles::from_profile(&StyleProfile::default(), None, live)
    }

    #[test]
    fn style_blocks_are_ordered() {
        let doc = assemble(&tree("<div>Jane</div>"), &styles(".live { color: red; }"));
        let live = doc.find("data-origin=\"live\"").unwrap();
        let profile = doc.find("data-origin=\"profile\"").unwrap();
        let overrides = doc.find("data-origin=\"overrides\"").unwrap();
        assert!(live < profile && profile < overrides);
        assert!(doc.contains("@page { size: 210mm 297mm; margin: 0; }"));
        assert!(doc.contains("<body>\n<div>Jane</div>\n</body>"));
    }

    #[test]
    fn font_link_precedes_styles() {
        let doc = assemble(&tree("<div></div>"), &styles(""));
        let link = doc.find("fonts.googleapis.com").unwrap();
        assert!(link < doc.find("<style").unwrap());
        assert!(doc.contains("family=Inter:wght@300;400;500;600;700&amp;display=swap"));
        assert!(!doc.contains("data-origin=\"live\""));
    }

    #[test]
    fn no_script_survives() {
        let doc = assemble(
            &tree(r#"<div onclick="edit()"><script>alert(1)</script><a href="javascript:x()">x</a></div>"#),
            &styles("</style><script>alert(2)</script>"),
        );
        assert!(!doc.contains("<script"));
        assert!(!doc.contains("onclick"));
        assert!(!doc.contains("javascript:"));
    }
}
