//! Pipeline – ties together preview lookup, variant detection, sanitizing,
//! layout normalization and document assembly into a single function call.
//!
//! Everything here is synchronous and side-effect free: the page is only
//! read, the exported subtree is a private clone.

use log::info;
use serde::Serialize;

use crate::config::ExportConfig;
use crate::document::{assemble, DocumentStyles};
use crate::dom::{find_by_id, ElementNode, Node};
use crate::error::{ExportError, Result};
use crate::layout::{
    normalize_with, select_content, BackgroundOrWidth, LayoutReport, RendererVariant,
    SidebarClassifier,
};
use crate::profile::StyleProfile;
use crate::sanitize::{sanitize, SanitizeReport};
use crate::snapshot::StyleSnapshot;

/// A print-ready document plus what was done to produce it.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedDocument {
    #[serde(skip)]
    pub html: String,
    pub profile: String,
    pub variant: RendererVariant,
    pub sanitized: SanitizeReport,
    pub layout: LayoutReport,
}

/// Run sanitizer, normalizer and assembler over a preview element.
pub fn prepare_document(
    preview: &ElementNode,
    profile: &StyleProfile,
    theme_color: Option<&str>,
    snapshot: &dyn StyleSnapshot,
) -> PreparedDocument {
    prepare_document_with(preview, profile, theme_color, snapshot, &BackgroundOrWidth)
}

/// [`prepare_document`] with a caller-chosen sidebar classifier.
pub fn prepare_document_with(
    preview: &ElementNode,
    profile: &StyleProfile,
    theme_color: Option<&str>,
    snapshot: &dyn StyleSnapshot,
    classifier: &dyn SidebarClassifier,
) -> PreparedDocument {
    // 1. Pick the renderer variant and clone its printable subtree
    let variant = RendererVariant::detect(preview);
    let mut tree = select_content(preview, variant);

    // 2. Strip editor affordances
    let sanitized = sanitize(&mut tree);

    // 3. Fit to the page and pin the columns
    let layout = normalize_with(&mut tree, profile, variant, classifier);

    // 4. Assemble with the live page's styles
    let styles = DocumentStyles::from_profile(profile, theme_color, snapshot.capture());
    let html = assemble(&tree, &styles);

    info!(
        "Prepared {variant:?} document with profile '{}' ({} nodes removed, {} bytes)",
        profile.name,
        sanitized.total(),
        html.len()
    );

    PreparedDocument {
        html,
        profile: profile.name.clone(),
        variant,
        sanitized,
        layout,
    }
}

/// Locate the preview in a parsed page and prepare it per `config`.
pub fn prepare_page(
    page: &[Node],
    config: &ExportConfig,
    snapshot: &dyn StyleSnapshot,
) -> Result<PreparedDocument> {
    let preview = find_by_id(page, &config.preview_id)
        .ok_or_else(|| ExportError::PreviewNotFound(config.preview_id.clone()))?;
    let profile = config.style_profile()?;
    Ok(prepare_document(
        preview,
        &profile,
        config.theme_color.as_deref(),
        snapshot,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::snapshot::FixedStyles;

    #[test]
    fn pipeline_basic() {
        let page = parse_html(
            r#"<main><div id="resume-preview"><div class="max-w-[210mm] bg-white"><h1>Jane Doe</h1><button>+ Add Section</button></div></div></main>"#,
        );
        let doc = prepare_page(&page, &ExportConfig::default(), &FixedStyles::new(".x{}")).unwrap();
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("Jane Doe"));
        assert!(!doc.html.contains("Add Section"));
        assert_eq!(doc.variant, RendererVariant::Legacy);
        assert_eq!(doc.sanitized.total(), 1);
        assert!(doc.layout.columns.is_none());
    }

    #[test]
    fn missing_preview_is_not_found() {
        let page = parse_html("<div id=\"other\"></div>");
        let err = prepare_page(&page, &ExportConfig::default(), &FixedStyles::default()).unwrap_err();
        assert!(matches!(err, ExportError::PreviewNotFound(ref id) if id == "resume-preview"));
    }

    #[test]
    fn live_page_is_not_mutated() {
        let page = parse_html(
            r#"<div id="resume-preview"><div class="bg-white" style="transform: scale(0.8)"><button>Delete</button>Body</div></div>"#,
        );
        let before = page.clone();
        prepare_page(&page, &ExportConfig::default(), &FixedStyles::default()).unwrap();
        assert_eq!(page, before);
    }
}
