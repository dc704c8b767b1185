//! Layout normalizer – rewrites the proportional geometry of a cloned preview
//! into fixed, page-relative pixel geometry a fixed-page print engine renders
//! the same way every time.
//!
//! Two passes:
//! 1. Page fit (always): fit-to-viewport transforms are dropped and the root
//!    is pinned to the physical page width.
//! 2. Columns (when a two-column row is found): each column gets an absolute
//!    pixel width computed from the usable page width, the sidebar loses its
//!    padding on the page edge, and column content is made wrap-safe.
//!
//! Only `style` attributes are edited; the node structure and reading order
//! are never touched.

use log::{debug, info};
use serde::Serialize;

use crate::dom::{ElementNode, Tag};
use crate::profile::StyleProfile;
use crate::style::{
    classify_transform, edit_inline_style, resolve_style, Dimension, FlexWrap, ResolvedStyle,
    StyleDeclarations, Transform,
};

/// Class carried by the root of the composable (section-based) renderer.
pub const VARIANT_MARKER_CLASS: &str = "resume-v2";

/// Column shares used when a column has no authored width.
pub const DEFAULT_MAIN_PCT: f32 = 60.0;
pub const DEFAULT_SIDEBAR_PCT: f32 = 35.0;
/// A column narrower than this share of the row reads as a sidebar.
const SIDEBAR_THRESHOLD_PCT: f32 = 50.0;
/// Deepest level (root = 0) searched for the page-level column row.
const MAX_ROW_DEPTH: usize = 3;
/// Absorbs float error when a pinned pixel width is read back as a share.
const PX_EPSILON: f32 = 1e-3;

/// Path of element-child indices from the normalized root.
pub type NodePath = Vec<usize>;

// ---------------------------------------------------------------------------
// Renderer variants and their strategies
// ---------------------------------------------------------------------------

/// Which renderer generation produced the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererVariant {
    /// One component per template, free-form markup.
    Legacy,
    /// Section-based renderer rooted at `.resume-v2`.
    Composable,
}

impl RendererVariant {
    /// Inspect the preview once for the composable renderer's marker.
    pub fn detect(preview: &ElementNode) -> Self {
        if preview.find(|e| e.has_class(VARIANT_MARKER_CLASS)).is_some() {
            RendererVariant::Composable
        } else {
            RendererVariant::Legacy
        }
    }

    pub fn strategy(self) -> &'static dyn LayoutStrategy {
        match self {
            RendererVariant::Legacy => &LegacyStrategy,
            RendererVariant::Composable => &ComposableStrategy,
        }
    }
}

/// How a renderer variant exposes its printable content and its columns.
pub trait LayoutStrategy: Sync {
    fn variant(&self) -> RendererVariant;

    /// Path from the preview element to the subtree that is exported.
    fn content_root(&self, preview: &ElementNode) -> NodePath;

    /// Path from the content root to the two-column row, if there is one.
    fn find_columns(&self, root: &ElementNode) -> Option<NodePath>;
}

/// Free-form templates: the page-sized wrapper is found by its classes and
/// the column row by breadth-first search.
pub struct LegacyStrategy;

impl LayoutStrategy for LegacyStrategy {
    fn variant(&self) -> RendererVariant {
        RendererVariant::Legacy
    }

    fn content_root(&self, preview: &ElementNode) -> NodePath {
        let candidates: [&dyn Fn(&ElementNode) -> bool; 3] = [
            &|e: &ElementNode| e.has_class("max-w-[210mm]"),
            &|e: &ElementNode| e.classes().iter().any(|c| c.contains("max-w")),
            &|e: &ElementNode| e.has_class("bg-white"),
        ];
        for pred in candidates {
            if let Some(path) = descendant_path(preview, pred) {
                return path;
            }
        }
        if preview.element_children().next().is_some() {
            return vec![0];
        }
        Vec::new()
    }

    fn find_columns(&self, root: &ElementNode) -> Option<NodePath> {
        let mut queue = std::collections::VecDeque::from([(Vec::new(), root)]);
        while let Some((path, el)) = queue.pop_front() {
            if is_column_row(el) {
                return Some(path);
            }
            if path.len() >= MAX_ROW_DEPTH || is_section_boundary(el) {
                continue;
            }
            for (i, child) in el.element_children().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                queue.push_back((child_path, child));
            }
        }
        None
    }
}

/// Section-based renderer: the marker element is the page and the column
/// row, when present, is one of its direct children.
pub struct ComposableStrategy;

impl LayoutStrategy for ComposableStrategy {
    fn variant(&self) -> RendererVariant {
        RendererVariant::Composable
    }

    fn content_root(&self, preview: &ElementNode) -> NodePath {
        if preview.has_class(VARIANT_MARKER_CLASS) {
            return Vec::new();
        }
        descendant_path(preview, &|e: &ElementNode| e.has_class(VARIANT_MARKER_CLASS)).unwrap_or_default()
    }

    fn find_columns(&self, root: &ElementNode) -> Option<NodePath> {
        root.element_children()
            .position(is_column_row)
            .map(|i| vec![i])
    }
}

/// Pre-order path to the first strict descendant matching `pred`.
fn descendant_path(el: &ElementNode, pred: &dyn Fn(&ElementNode) -> bool) -> Option<NodePath> {
    for (i, child) in el.element_children().enumerate() {
        if pred(child) {
            return Some(vec![i]);
        }
        if let Some(mut rest) = descendant_path(child, pred) {
            rest.insert(0, i);
            return Some(rest);
        }
    }
    None
}

/// Clone the exported subtree out of the preview.
pub fn select_content(preview: &ElementNode, variant: RendererVariant) -> ElementNode {
    let path = variant.strategy().content_root(preview);
    preview.descend(&path).unwrap_or(preview).clone()
}

/// Sections, headers and lists hold item rows, never the page columns.
fn is_section_boundary(el: &ElementNode) -> bool {
    el.has_attr("data-section")
        || matches!(el.tag, Tag::Ul | Tag::Ol | Tag::Li)
        || ["section", "header", "footer"].iter().any(|t| el.tag.is(t))
}

/// A column that only frames a picture (header photo rows).
fn is_image_wrapper(el: &ElementNode) -> bool {
    el.text_content().trim().is_empty() && el.find(|e| matches!(e.tag, Tag::Img)).is_some()
}

/// A non-wrapping flex row with exactly two container children, at least one
/// of which carries a width or a panel background.
fn is_column_row(el: &ElementNode) -> bool {
    if is_section_boundary(el) {
        return false;
    }
    let style = resolve_style(el);
    if !style.is_flex_row() || style.flex_wrap != FlexWrap::NoWrap {
        return false;
    }
    let children: Vec<&ElementNode> = el.element_children().collect();
    let [a, b] = children.as_slice() else {
        return false;
    };
    if !a.tag.is_container() || !b.tag.is_container() || is_image_wrapper(a) || is_image_wrapper(b)
    {
        return false;
    }
    [a, b].iter().any(|c| {
        let s = resolve_style(c);
        s.authored_width() != Dimension::Auto || s.has_panel_background()
    })
}

// ---------------------------------------------------------------------------
// Sidebar classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnRole {
    Sidebar,
    Main,
}

/// What a classifier may look at for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFacts {
    pub has_panel_background: bool,
    /// Authored width as a share of the usable row width.
    pub width_pct: Option<f32>,
    /// Value of a `data-column` attribute.
    pub marker: Option<String>,
}

/// Decides which of the two columns, if either, is the sidebar.
pub trait SidebarClassifier {
    fn sidebar(&self, columns: &[ColumnFacts; 2]) -> Option<usize>;
}

/// Background first, then the width threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackgroundOrWidth;

impl SidebarClassifier for BackgroundOrWidth {
    fn sidebar(&self, columns: &[ColumnFacts; 2]) -> Option<usize> {
        match (columns[0].has_panel_background, columns[1].has_panel_background) {
            (true, false) => return Some(0),
            (false, true) => return Some(1),
            _ => {}
        }
        let narrow = |i: usize| {
            columns[i]
                .width_pct
                .filter(|w| *w < SIDEBAR_THRESHOLD_PCT)
        };
        match (narrow(0), narrow(1)) {
            (Some(_), None) => Some(0),
            (None, Some(_)) => Some(1),
            (Some(a), Some(b)) => Some(if b < a { 1 } else { 0 }),
            (None, None) => None,
        }
    }
}

/// Trusts only an explicit `data-column="sidebar"` attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitMarker;

impl SidebarClassifier for ExplicitMarker {
    fn sidebar(&self, columns: &[ColumnFacts; 2]) -> Option<usize> {
        columns
            .iter()
            .position(|c| c.marker.as_deref() == Some("sidebar"))
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What the normalizer did, for logging and `--report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub variant: RendererVariant,
    pub page_width_px: f32,
    pub removed_transforms: usize,
    pub columns: Option<ColumnPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPlan {
    pub row_path: NodePath,
    /// Horizontal padding of the row and its ancestors.
    pub horizontal_padding_px: f32,
    pub gap_px: f32,
    pub usable_width_px: f32,
    pub sidebar: Option<usize>,
    pub columns: [PlannedColumn; 2],
}

impl ColumnPlan {
    pub fn total_width_px(&self) -> f32 {
        self.columns.iter().map(|c| c.width_px).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedColumn {
    pub role: ColumnRole,
    pub authored_pct: Option<f32>,
    pub width_pct: f32,
    pub width_px: f32,
    pub zeroed_edge: Option<PageEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageEdge {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize with the default sidebar heuristic.
pub fn normalize(
    root: &mut ElementNode,
    profile: &StyleProfile,
    variant: RendererVariant,
) -> LayoutReport {
    normalize_with(root, profile, variant, &BackgroundOrWidth)
}

pub fn normalize_with(
    root: &mut ElementNode,
    profile: &StyleProfile,
    variant: RendererVariant,
    classifier: &dyn SidebarClassifier,
) -> LayoutReport {
    let page_width_px = profile.page.width_px();
    let removed_transforms = fit_to_page(root, page_width_px);

    let columns = variant
        .strategy()
        .find_columns(root)
        .and_then(|path| apply_columns(root, &path, page_width_px, classifier));

    match &columns {
        Some(plan) => info!(
            "Two-column layout at {:?}: {}px + {}px (usable {}px, gap {}px)",
            plan.row_path,
            plan.columns[0].width_px,
            plan.columns[1].width_px,
            plan.usable_width_px,
            plan.gap_px
        ),
        None => debug!("No two-column row found, single-column layout"),
    }

    LayoutReport {
        variant,
        page_width_px,
        removed_transforms,
        columns,
    }
}

/// Drop fit-to-viewport transforms and pin the root to the page width.
/// Returns how many transforms were removed.
fn fit_to_page(root: &mut ElementNode, page_width_px: f32) -> usize {
    let mut removed = strip_fit_transform(root, true);
    for child in root.element_children_mut() {
        removed += strip_descendant_transforms(child);
    }
    edit_inline_style(root, |d| {
        d.set_important("width", px(page_width_px));
        d.set_important("max-width", px(page_width_px));
        d.set_important("box-sizing", "border-box");
    });
    removed
}

fn strip_descendant_transforms(el: &mut ElementNode) -> usize {
    if matches!(el.tag, Tag::Svg) {
        return 0;
    }
    let mut removed = strip_fit_transform(el, false);
    for child in el.element_children_mut() {
        removed += strip_descendant_transforms(child);
    }
    removed
}

/// The root loses any scale/translate transform; descendants only lose
/// scaling, since translation below the root positions decorations.
fn strip_fit_transform(el: &mut ElementNode, is_root: bool) -> usize {
    let inline = el
        .inline_style()
        .and_then(|s| {
            StyleDeclarations::parse(s)
                .get("transform")
                .map(str::to_string)
        })
        .filter(|t| classify_transform(t) == Transform::ScaleOrTranslate)
        .filter(|t| is_root || t.to_ascii_lowercase().contains("scale"));
    let class_scaled = el.classes().iter().any(|c| {
        let c = c.trim_start_matches('-');
        c.starts_with("scale-") || (is_root && c.starts_with("translate-"))
    });

    if inline.is_none() && !class_scaled {
        return 0;
    }
    edit_inline_style(el, |d| {
        if inline.is_some() {
            d.remove("transform");
            d.remove("transform-origin");
        }
        if class_scaled {
            d.set_important("transform", "none");
        }
    });
    1
}

fn px(v: f32) -> String {
    format!("{v}px")
}

fn horizontal_padding(style: &ResolvedStyle, basis: f32) -> (f32, f32) {
    (
        style.padding.left.to_px(basis).unwrap_or(0.0),
        style.padding.right.to_px(basis).unwrap_or(0.0),
    )
}

fn apply_columns(
    root: &mut ElementNode,
    row_path: &[usize],
    page_width_px: f32,
    classifier: &dyn SidebarClassifier,
) -> Option<ColumnPlan> {
    // Padding of every box from the root down to the row narrows the row.
    let mut padding = 0.0;
    for depth in 0..=row_path.len() {
        let el = root.descend(&row_path[..depth])?;
        let (l, r) = horizontal_padding(&resolve_style(el), page_width_px);
        padding += l + r;
    }
    let row = root.descend_mut(row_path)?;
    let row_style = resolve_style(row);
    let inner = (page_width_px - padding).max(0.0);
    let gap_px = row_style.gap.to_px(inner).unwrap_or(0.0).max(0.0);
    let usable = (inner - gap_px).max(0.0);

    let styles: Vec<ResolvedStyle> = row.element_children().map(resolve_style).collect();
    let facts: [ColumnFacts; 2] = {
        let mut cols = row.element_children().zip(&styles).map(|(el, s)| ColumnFacts {
            has_panel_background: s.has_panel_background(),
            width_pct: authored_pct(s.authored_width(), usable),
            marker: el.attr("data-column").map(|m| m.trim().to_ascii_lowercase()),
        });
        [cols.next()?, cols.next()?]
    };
    let sidebar = classifier.sidebar(&facts);
    let roles = match sidebar {
        Some(0) => [ColumnRole::Sidebar, ColumnRole::Main],
        Some(_) => [ColumnRole::Main, ColumnRole::Sidebar],
        None => [ColumnRole::Main, ColumnRole::Main],
    };

    let shares = column_shares(&facts, &roles);
    let mut planned = Vec::with_capacity(2);
    for (i, column) in row.element_children_mut().enumerate() {
        let width_px = (usable * shares[i] / 100.0 + PX_EPSILON).floor();
        // A reversed row paints its first child against the right edge.
        let zeroed_edge = match (sidebar, i, row_style.flex_reverse) {
            (Some(0), 0, false) | (Some(1), 1, true) => Some(PageEdge::Left),
            (Some(0), 0, true) | (Some(1), 1, false) => Some(PageEdge::Right),
            _ => None,
        };
        pin_column(column, width_px, zeroed_edge);
        make_wrap_safe(column);
        planned.push(PlannedColumn {
            role: roles[i],
            authored_pct: facts[i].width_pct,
            width_pct: shares[i],
            width_px,
            zeroed_edge,
        });
    }
    edit_inline_style(row, |d| {
        d.set_important("flex-wrap", "nowrap");
        d.set_important("column-gap", px(gap_px));
    });

    let columns: [PlannedColumn; 2] = planned.try_into().ok()?;
    Some(ColumnPlan {
        row_path: row_path.to_vec(),
        horizontal_padding_px: padding,
        gap_px,
        usable_width_px: usable,
        sidebar,
        columns,
    })
}

fn authored_pct(width: Dimension, usable: f32) -> Option<f32> {
    match width {
        Dimension::Percent(p) if p > 0.0 => Some(p),
        Dimension::Px(v) if v > 0.0 && usable > 0.0 => Some(v / usable * 100.0),
        _ => None,
    }
}

/// Final percentage share of each column. A column without a width takes
/// the rest of the row when the other one has a width, or its role default
/// when neither has. Shares summing past 100 are scaled down.
fn column_shares(facts: &[ColumnFacts; 2], roles: &[ColumnRole; 2]) -> [f32; 2] {
    let default_for = |role: ColumnRole| match role {
        ColumnRole::Sidebar => DEFAULT_SIDEBAR_PCT,
        ColumnRole::Main => DEFAULT_MAIN_PCT,
    };
    let mut shares = match (facts[0].width_pct, facts[1].width_pct) {
        (Some(a), Some(b)) => [a, b],
        (Some(a), None) => [a, (100.0 - a).max(0.0)],
        (None, Some(b)) => [(100.0 - b).max(0.0), b],
        (None, None) if roles[0] == roles[1] => [50.0, 50.0],
        (None, None) => [default_for(roles[0]), default_for(roles[1])],
    };
    let total = shares[0] + shares[1];
    if total > 100.0 {
        for s in &mut shares {
            *s *= 100.0 / total;
        }
    }
    shares
}

fn pin_column(column: &mut ElementNode, width_px: f32, zeroed_edge: Option<PageEdge>) {
    edit_inline_style(column, |d| {
        let w = px(width_px);
        d.set_important("width", w.clone());
        d.set_important("max-width", w.clone());
        d.set_important("min-width", w.clone());
        d.set_important("flex-basis", w);
        d.set_important("flex-grow", "0");
        d.set_important("flex-shrink", "0");
        d.set_important("box-sizing", "border-box");
        d.set("overflow-wrap", "break-word");
        match zeroed_edge {
            Some(PageEdge::Left) => d.set_important("padding-left", "0"),
            Some(PageEdge::Right) => d.set_important("padding-right", "0"),
            None => {}
        }
    });
}

/// Keep long unbroken tokens inside the column.
fn make_wrap_safe(el: &mut ElementNode) {
    for child in el.element_children_mut() {
        if matches!(child.tag, Tag::Svg) {
            continue;
        }
        let needs_cap = resolve_style(child).max_width == Dimension::Auto;
        edit_inline_style(child, |d| {
            if needs_cap {
                d.set("max-width", "100%");
            }
            d.set("overflow-wrap", "break-word");
            d.set("word-break", "break-word");
        });
        make_wrap_safe(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, Node};

    fn root(html: &str) -> ElementNode {
        match parse_html(html).into_iter().next() {
            Some(Node::Element(e)) => e,
            _ => panic!("Expected element"),
        }
    }

    fn decl(el: &ElementNode, prop: &str) -> Option<String> {
        StyleDeclarations::parse(el.inline_style()?)
            .get(prop)
            .map(str::to_string)
    }

    const TWO_COLUMN: &str = r#"<div class="page"><div style="display: flex; padding: 0 28px; gap: 24px"><div style="width: 35%; background-color: #f1f5f9; padding: 24px">Side</div><div style="width: 65%; padding: 24px">Main</div></div></div>"#;

    #[test]
    fn detects_variant_by_marker() {
        assert_eq!(
            RendererVariant::detect(&root(r#"<div><div class="resume-v2"></div></div>"#)),
            RendererVariant::Composable
        );
        assert_eq!(
            RendererVariant::detect(&root(r#"<div class="resume-v1"></div>"#)),
            RendererVariant::Legacy
        );
    }

    #[test]
    fn legacy_content_root_order() {
        let preview = root(
            r#"<div id="p"><div class="bg-white"><div class="max-w-[210mm] w-full">x</div></div></div>"#,
        );
        assert_eq!(LegacyStrategy.content_root(&preview), vec![0, 0]);
        let preview = root(r#"<div id="p"><div class="shadow"><div class="bg-white">x</div></div></div>"#);
        assert_eq!(LegacyStrategy.content_root(&preview), vec![0, 0]);
        let preview = root(r#"<div id="p"><div class="shadow">x</div></div>"#);
        assert_eq!(LegacyStrategy.content_root(&preview), vec![0]);
        assert!(LegacyStrategy.content_root(&root("<div>x</div>")).is_empty());
    }

    #[test]
    fn splits_usable_width_35_65() {
        let mut r = root(TWO_COLUMN);
        let report = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        let plan = report.columns.expect("two columns");
        assert_eq!(plan.usable_width_px, 714.0);
        assert_eq!(plan.columns[0].width_px, 249.0);
        assert_eq!(plan.columns[1].width_px, 464.0);
        assert!(plan.total_width_px() + plan.gap_px <= 794.0 - 56.0);
        assert_eq!(plan.sidebar, Some(0));

        let side = r.descend(&[0, 0]).unwrap();
        assert_eq!(decl(side, "width").as_deref(), Some("249px"));
        assert_eq!(decl(side, "min-width").as_deref(), Some("249px"));
        assert_eq!(decl(side, "flex-shrink").as_deref(), Some("0"));
        assert_eq!(decl(side, "padding-left").as_deref(), Some("0"));
        let main = r.descend(&[0, 1]).unwrap();
        assert_eq!(decl(main, "padding-right"), None);
    }

    #[test]
    fn sidebar_on_the_right_loses_right_padding() {
        let mut r = root(
            r#"<div class="flex"><div class="w-[65%] p-8">Main</div><div class="w-[35%] p-8 bg-gray-50">Side</div></div>"#,
        );
        let report = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        let plan = report.columns.unwrap();
        assert_eq!(plan.row_path, Vec::<usize>::new());
        assert_eq!(plan.sidebar, Some(1));
        assert_eq!(plan.columns[1].zeroed_edge, Some(PageEdge::Right));
        let side = r.descend(&[1]).unwrap();
        assert_eq!(decl(side, "padding-right").as_deref(), Some("0"));
    }

    #[test]
    fn reversed_row_zeroes_the_right_edge() {
        let mut r = root(
            r#"<div class="flex flex-row-reverse"><div class="w-[35%] p-8 bg-slate-100">Side</div><div class="w-[65%] p-8">Main</div></div>"#,
        );
        let plan = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy)
            .columns
            .unwrap();
        assert_eq!(plan.sidebar, Some(0));
        assert_eq!(plan.columns[0].zeroed_edge, Some(PageEdge::Right));
        assert_eq!(plan.columns[1].zeroed_edge, None);
        let side = r.descend(&[0]).unwrap();
        assert_eq!(decl(side, "padding-right").as_deref(), Some("0"));
        assert_eq!(decl(side, "padding-left"), None);
    }

    #[test]
    fn white_panels_classify_by_width() {
        let mut r = root(
            r#"<div class="flex"><div class="w-[30%] p-8 bg-white">Side</div><div class="w-[70%] p-8">Main</div></div>"#,
        );
        let plan = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy)
            .columns
            .unwrap();
        assert_eq!(plan.sidebar, Some(0));
        assert_eq!(plan.columns[0].role, ColumnRole::Sidebar);
        assert_eq!(plan.columns[0].zeroed_edge, Some(PageEdge::Left));

        // A wide white column is never the sidebar on background alone.
        let mut r = root(
            r#"<div class="flex"><div class="w-[70%] bg-white">Main</div><div class="w-[30%]">Side</div></div>"#,
        );
        let plan = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy)
            .columns
            .unwrap();
        assert_eq!(plan.sidebar, Some(1));
    }

    #[test]
    fn missing_widths_use_default_split() {
        let mut r = root(
            r#"<div><div class="flex"><div style="background: #1e3a8a">Side</div><div>Main</div></div></div>"#,
        );
        let plan = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy)
            .columns
            .unwrap();
        assert_eq!(plan.columns[0].width_pct, DEFAULT_SIDEBAR_PCT);
        assert_eq!(plan.columns[1].width_pct, DEFAULT_MAIN_PCT);
        assert_eq!(plan.columns[0].width_px, (794.0f32 * 0.35).floor());
    }

    #[test]
    fn oversized_shares_are_scaled_down() {
        let facts = [
            ColumnFacts {
                has_panel_background: false,
                width_pct: Some(40.0),
                marker: None,
            },
            ColumnFacts {
                has_panel_background: false,
                width_pct: Some(80.0),
                marker: None,
            },
        ];
        let shares = column_shares(&facts, &[ColumnRole::Sidebar, ColumnRole::Main]);
        assert!((shares[0] + shares[1] - 100.0).abs() < 0.01);
    }

    #[test]
    fn width_threshold_classifies_when_no_background() {
        let facts = |a: Option<f32>, b: Option<f32>| {
            [
                ColumnFacts {
                    has_panel_background: false,
                    width_pct: a,
                    marker: None,
                },
                ColumnFacts {
                    has_panel_background: false,
                    width_pct: b,
                    marker: None,
                },
            ]
        };
        assert_eq!(BackgroundOrWidth.sidebar(&facts(Some(70.0), Some(30.0))), Some(1));
        assert_eq!(BackgroundOrWidth.sidebar(&facts(Some(30.0), None)), Some(0));
        assert_eq!(BackgroundOrWidth.sidebar(&facts(Some(60.0), Some(60.0))), None);
    }

    #[test]
    fn explicit_marker_classifier() {
        let mut r = root(
            r#"<div class="flex"><div class="w-1/2 bg-blue-900">A</div><div class="w-1/2" data-column="sidebar">B</div></div>"#,
        );
        let report = normalize_with(
            &mut r,
            &StyleProfile::default(),
            RendererVariant::Legacy,
            &ExplicitMarker,
        );
        assert_eq!(report.columns.unwrap().sidebar, Some(1));
    }

    #[test]
    fn title_date_rows_are_not_columns() {
        let mut r = root(
            r#"<div><section><div class="flex justify-between"><div>Engineer</div><div>2020</div></div></section><div class="flex"><div>A</div><div>B</div></div></div>"#,
        );
        let report = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        assert!(report.columns.is_none());
    }

    #[test]
    fn composable_row_with_percentage_gap() {
        let mut r = root(
            r#"<div class="resume-v2" style="width: 100%"><div data-section="header"><h1>Jane</h1></div><div style="display: flex; flex-direction: row; gap: 3%; padding: 0 32px 32px 32px"><div style="width: 60%; padding-right: 0">Main</div><div style="width: 35%; background-color: #f9fafb; padding: 20px">Side</div></div></div>"#,
        );
        let report = normalize(&mut r, &StyleProfile::default(), RendererVariant::Composable);
        let plan = report.columns.unwrap();
        assert_eq!(plan.row_path, vec![1]);
        assert_eq!(plan.sidebar, Some(1));
        let inner = 794.0 - 64.0;
        assert!((plan.gap_px - inner * 0.03).abs() < 0.01);
        assert!(plan.total_width_px() + plan.gap_px <= inner);
    }

    #[test]
    fn single_column_drops_fit_transform_and_pins_width() {
        let mut r = root(
            r#"<div class="w-full" style="transform: scale(0.8); transform-origin: top left"><div style="transform: translateX(-50%)">dot</div><div class="scale-75">zoomed</div></div>"#,
        );
        let report = normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        assert_eq!(report.removed_transforms, 2);
        assert!(report.columns.is_none());
        assert_eq!(decl(&r, "transform"), None);
        assert_eq!(decl(&r, "transform-origin"), None);
        assert_eq!(decl(&r, "width").as_deref(), Some("794px"));
        let dot = r.descend(&[0]).unwrap();
        assert_eq!(decl(dot, "transform").as_deref(), Some("translateX(-50%)"));
        let zoomed = r.descend(&[1]).unwrap();
        assert_eq!(decl(zoomed, "transform").as_deref(), Some("none"));
    }

    #[test]
    fn normalization_keeps_structure_and_is_stable() {
        let mut r = root(TWO_COLUMN);
        let text_before = r.text_content();
        normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        assert_eq!(r.text_content(), text_before);
        let once = r.clone();
        normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        assert_eq!(r, once);
    }

    #[test]
    fn long_tokens_wrap_inside_columns() {
        let mut r = root(TWO_COLUMN.replace("Main", "<p>aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa</p>").as_str());
        normalize(&mut r, &StyleProfile::default(), RendererVariant::Legacy);
        let p = r.descend(&[0, 1, 0]).unwrap();
        assert_eq!(decl(p, "max-width").as_deref(), Some("100%"));
        assert_eq!(decl(p, "word-break").as_deref(), Some("break-word"));
    }
}
