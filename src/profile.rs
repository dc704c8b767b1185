//! Style configuration registry – named layout profiles and the CSS they
//! contribute to the exported document.
//!
//! A profile is an immutable bundle of page geometry, font stacks, a type
//! scale, spacing tokens and colours. It renders to two text blobs:
//! custom-property declarations ([`to_variables`]) and print-safe base rules
//! ([`to_base_stylesheet`]).

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExportError, Result};
use crate::sanitize::AFFORDANCE_SELECTORS;
use crate::style::PX_PER_MM;

pub const SINGLE_COLUMN: &str = "single-column";
pub const TWO_COLUMN: &str = "two-column";
pub const COMPACT: &str = "compact";

/// Names of the built-in profiles, default first.
pub const PROFILE_NAMES: &[&str] = &[SINGLE_COLUMN, TWO_COLUMN, COMPACT];

const INTER_FONT_LINK: &str =
    "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap";

/// A named layout profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub name: String,
    pub layout: LayoutKind,
    pub page: PageGeometry,
    /// Main column share of the row, in percent.
    pub content_width_pct: f32,
    /// Sidebar share of the row, in percent (two-column profiles).
    pub sidebar_width_pct: Option<f32>,
    pub fonts: FontStacks,
    /// Web-font stylesheet linked from the document head.
    pub font_link: Option<String>,
    pub type_scale: TypeScale,
    pub skill_tag: SkillTag,
    pub spacing: Spacing,
    pub colors: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    SingleColumn,
    TwoColumn,
}

/// Physical page size and margins in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margins_mm: Margins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl PageGeometry {
    /// Page width in CSS pixels (96 DPI), rounded to whole pixels.
    pub fn width_px(&self) -> f32 {
        (self.width_mm * PX_PER_MM).round()
    }

    pub fn height_px(&self) -> f32 {
        (self.height_mm * PX_PER_MM).round()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStacks {
    pub primary: String,
    pub secondary: String,
    pub monospace: String,
}

/// Size, weight and line height of one text role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToken {
    pub size: String,
    pub weight: u16,
    pub line_height: f32,
}

impl TextToken {
    fn new(size: &str, weight: u16, line_height: f32) -> Self {
        Self {
            size: size.to_string(),
            weight,
            line_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeScale {
    pub name: TextToken,
    pub title: TextToken,
    pub contact: TextToken,
    pub section_heading: TextToken,
    pub section_border_width: String,
    pub item_title: TextToken,
    pub item_subtitle: TextToken,
    pub item_date: TextToken,
    pub item_description: TextToken,
    pub header_padding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTag {
    pub size: String,
    pub padding: String,
    pub border_radius: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub section_gap: String,
    pub item_gap: String,
    pub bullet_gap: String,
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_light: String,
    pub background_primary: String,
    pub background_secondary: String,
    pub border: String,
}

impl StyleProfile {
    /// Traditional single-column resume; header runs edge to edge.
    pub fn single_column() -> Self {
        Self {
            name: SINGLE_COLUMN.to_string(),
            layout: LayoutKind::SingleColumn,
            page: PageGeometry {
                width_mm: 210.0,
                height_mm: 297.0,
                margins_mm: Margins {
                    top: 0.0,
                    right: 0.0,
                    bottom: 20.0,
                    left: 0.0,
                },
            },
            content_width_pct: 100.0,
            sidebar_width_pct: None,
            fonts: FontStacks {
                primary: "'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
                    .to_string(),
                secondary: "'Georgia', 'Times New Roman', serif".to_string(),
                monospace: "'Fira Code', 'Consolas', monospace".to_string(),
            },
            font_link: Some(INTER_FONT_LINK.to_string()),
            type_scale: TypeScale {
                name: TextToken::new("32px", 700, 1.2),
                title: TextToken::new("16px", 400, 1.4),
                contact: TextToken::new("13px", 400, 1.5),
                section_heading: TextToken::new("16px", 600, 1.3),
                section_border_width: "0.75px".to_string(),
                item_title: TextToken::new("15px", 600, 1.4),
                item_subtitle: TextToken::new("14px", 500, 1.4),
                item_date: TextToken::new("12px", 400, 1.4),
                item_description: TextToken::new("13px", 400, 1.6),
                header_padding: "32px 40px".to_string(),
            },
            skill_tag: SkillTag {
                size: "12px".to_string(),
                padding: "6px 16px".to_string(),
                border_radius: "9999px".to_string(),
            },
            spacing: Spacing {
                section_gap: "28px".to_string(),
                item_gap: "20px".to_string(),
                bullet_gap: "6px".to_string(),
                line_height: 1.6,
            },
            colors: Palette {
                primary: "#2563eb".to_string(),
                text_primary: "#1a1a1a".to_string(),
                text_secondary: "#6b7280".to_string(),
                text_light: "#ffffff".to_string(),
                background_primary: "#ffffff".to_string(),
                background_secondary: "#f9fafb".to_string(),
                border: "#e5e7eb".to_string(),
            },
        }
    }

    /// Sidebar + main layout with no page margins.
    pub fn two_column() -> Self {
        let base = Self::single_column();
        Self {
            name: TWO_COLUMN.to_string(),
            layout: LayoutKind::TwoColumn,
            page: PageGeometry {
                margins_mm: Margins {
                    top: 0.0,
                    right: 0.0,
                    bottom: 0.0,
                    left: 0.0,
                },
                ..base.page
            },
            content_width_pct: 65.0,
            sidebar_width_pct: Some(35.0),
            type_scale: TypeScale {
                name: TextToken::new("28px", 700, 1.2),
                title: TextToken::new("14px", 500, 1.4),
                contact: TextToken::new("12px", 400, 1.5),
                section_heading: TextToken::new("14px", 600, 1.3),
                section_border_width: "0.75px".to_string(),
                item_title: TextToken::new("14px", 600, 1.4),
                item_subtitle: TextToken::new("13px", 500, 1.4),
                item_date: TextToken::new("11px", 400, 1.4),
                item_description: TextToken::new("12px", 400, 1.55),
                header_padding: "24px".to_string(),
            },
            skill_tag: SkillTag {
                size: "11px".to_string(),
                padding: "4px 10px".to_string(),
                border_radius: "4px".to_string(),
            },
            spacing: Spacing {
                section_gap: "24px".to_string(),
                item_gap: "16px".to_string(),
                bullet_gap: "4px".to_string(),
                line_height: 1.55,
            },
            colors: Palette {
                background_secondary: "#f8fafc".to_string(),
                ..base.colors
            },
            ..base
        }
    }

    /// Single-column geometry with a denser type scale.
    pub fn compact() -> Self {
        let base = Self::single_column();
        let scale = base.type_scale.clone();
        Self {
            name: COMPACT.to_string(),
            type_scale: TypeScale {
                name: TextToken::new("26px", 700, 1.2),
                title: TextToken::new("14px", 400, 1.4),
                contact: TextToken::new("11px", 400, 1.5),
                section_heading: TextToken::new("14px", 600, 1.3),
                item_title: TextToken::new("13px", 600, 1.4),
                item_subtitle: TextToken::new("12px", 500, 1.4),
                item_date: TextToken::new("11px", 400, 1.4),
                item_description: TextToken::new("11px", 400, 1.5),
                header_padding: "24px 32px".to_string(),
                ..scale
            },
            spacing: Spacing {
                section_gap: "20px".to_string(),
                item_gap: "14px".to_string(),
                bullet_gap: "4px".to_string(),
                line_height: 1.5,
            },
            ..base
        }
    }

    /// Deep-merge a partial JSON object over this profile. Objects merge key
    /// by key; any other value replaces the original.
    pub fn apply_overrides(&self, overrides: &Value) -> Result<Self> {
        if !overrides.is_object() {
            return Err(ExportError::Config(
                "profile overrides must be a JSON object".to_string(),
            ));
        }
        let mut merged = serde_json::to_value(self)
            .map_err(|e| ExportError::Config(format!("cannot serialize profile: {e}")))?;
        deep_merge(&mut merged, overrides);
        serde_json::from_value(merged)
            .map_err(|e| ExportError::Config(format!("invalid profile override: {e}")))
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self::single_column()
    }
}

fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Look up a built-in profile; unknown names fall back to the default.
pub fn resolve_profile(name: &str) -> StyleProfile {
    match name.trim().to_ascii_lowercase().as_str() {
        SINGLE_COLUMN => StyleProfile::single_column(),
        TWO_COLUMN => StyleProfile::two_column(),
        COMPACT => StyleProfile::compact(),
        other => {
            warn!("Unknown style profile '{other}', falling back to '{SINGLE_COLUMN}'");
            StyleProfile::default()
        }
    }
}

/// Accept a caller-supplied accent colour only if it cannot break out of a
/// declaration.
fn accent_color<'a>(profile: &'a StyleProfile, requested: Option<&'a str>) -> &'a str {
    match requested.map(str::trim) {
        Some(c) if !c.is_empty() && !c.contains([';', '{', '}', '<', '>']) => c,
        Some("") | None => &profile.colors.primary,
        Some(rejected) => {
            warn!("Ignoring unsafe theme colour {rejected:?}");
            &profile.colors.primary
        }
    }
}

/// Render the profile as `:root` custom properties. `theme_color`, when
/// given, replaces the primary accent.
pub fn to_variables(profile: &StyleProfile, theme_color: Option<&str>) -> String {
    let t = &profile.type_scale;
    let m = &profile.page.margins_mm;
    let c = &profile.colors;
    let mut css = String::from(":root {\n");
    let mut var = |name: &str, value: &str| {
        css.push_str(&format!("  --pdf-{name}: {value};\n"));
    };

    var("page-width", &format!("{}mm", profile.page.width_mm));
    var("page-height", &format!("{}mm", profile.page.height_mm));
    var(
        "page-margin",
        &format!("{}mm {}mm {}mm {}mm", m.top, m.right, m.bottom, m.left),
    );
    var("content-width", &format!("{}%", profile.content_width_pct));
    if let Some(sidebar) = profile.sidebar_width_pct {
        var("sidebar-width", &format!("{sidebar}%"));
    }

    var("font-primary", &profile.fonts.primary);
    var("font-secondary", &profile.fonts.secondary);
    var("font-mono", &profile.fonts.monospace);

    for (role, token) in [
        ("header-name", &t.name),
        ("header-title", &t.title),
        ("header-contact", &t.contact),
        ("section-heading", &t.section_heading),
        ("item-title", &t.item_title),
        ("item-subtitle", &t.item_subtitle),
        ("item-date", &t.item_date),
        ("item-description", &t.item_description),
    ] {
        var(&format!("{role}-size"), &token.size);
        var(&format!("{role}-weight"), &token.weight.to_string());
        var(&format!("{role}-line-height"), &token.line_height.to_string());
    }
    var("header-padding", &t.header_padding);
    var("section-border-width", &t.section_border_width);

    var("skill-tag-size", &profile.skill_tag.size);
    var("skill-tag-padding", &profile.skill_tag.padding);
    var("skill-tag-radius", &profile.skill_tag.border_radius);

    var("section-gap", &profile.spacing.section_gap);
    var("item-gap", &profile.spacing.item_gap);
    var("bullet-gap", &profile.spacing.bullet_gap);
    var("line-height", &profile.spacing.line_height.to_string());

    var("color-primary", accent_color(profile, theme_color));
    var("color-text-primary", &c.text_primary);
    var("color-text-secondary", &c.text_secondary);
    var("color-text-light", &c.text_light);
    var("color-bg-primary", &c.background_primary);
    var("color-bg-secondary", &c.background_secondary);
    var("color-border", &c.border);

    css.push('}');
    css
}

/// Print-safe base rules expressed against the variables of [`to_variables`].
pub fn to_base_stylesheet(profile: &StyleProfile) -> String {
    let page = &profile.page;
    let m = &page.margins_mm;
    let mut css = format!(
        "@page {{ size: {}mm {}mm; margin: {}mm {}mm {}mm {}mm; }}\n",
        page.width_mm, page.height_mm, m.top, m.right, m.bottom, m.left
    );
    css.push_str(
        r#"* { box-sizing: border-box; }
html, body {
  margin: 0;
  padding: 0;
  font-family: var(--pdf-font-primary);
  line-height: var(--pdf-line-height);
  color: var(--pdf-color-text-primary);
  background: var(--pdf-color-bg-primary);
  -webkit-print-color-adjust: exact;
  print-color-adjust: exact;
  color-adjust: exact;
}
.resume-name { font-size: var(--pdf-header-name-size); font-weight: var(--pdf-header-name-weight); line-height: var(--pdf-header-name-line-height); letter-spacing: -0.02em; }
.resume-title { font-size: var(--pdf-header-title-size); font-weight: var(--pdf-header-title-weight); }
.resume-contact { font-size: var(--pdf-header-contact-size); }
.section-heading { font-size: var(--pdf-section-heading-size); font-weight: var(--pdf-section-heading-weight); border-left: var(--pdf-section-border-width) solid var(--pdf-color-primary); }
.item-title { font-size: var(--pdf-item-title-size); font-weight: var(--pdf-item-title-weight); }
.item-subtitle { font-size: var(--pdf-item-subtitle-size); color: var(--pdf-color-primary); }
.item-date { font-size: var(--pdf-item-date-size); color: var(--pdf-color-primary); }
.item-description { font-size: var(--pdf-item-description-size); line-height: var(--pdf-item-description-line-height); }
.skill-tag { font-size: var(--pdf-skill-tag-size); padding: var(--pdf-skill-tag-padding); border-radius: var(--pdf-skill-tag-radius); }
.resume-section { margin-bottom: var(--pdf-section-gap); break-inside: auto; }
.resume-section:last-child { margin-bottom: 0; }
.resume-item { margin-bottom: var(--pdf-item-gap); break-inside: avoid; }
.resume-item:last-child { margin-bottom: 0; }
ul { list-style-type: disc; list-style-position: outside; padding-left: 1.25em; }
ol { list-style-type: decimal; list-style-position: outside; padding-left: 1.25em; }
li { display: list-item; margin-bottom: var(--pdf-bullet-gap); }
li:last-child { margin-bottom: 0; }
img, svg { max-width: 100%; }
"#,
    );
    css.push_str(&AFFORDANCE_SELECTORS.join(",\n"));
    css.push_str(" { display: none !important; }\n");
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_profile_falls_back_to_default() {
        assert_eq!(resolve_profile("nope").name, SINGLE_COLUMN);
        assert_eq!(resolve_profile(" Two-Column ").name, TWO_COLUMN);
    }

    #[test]
    fn a4_is_794_pixels_wide() {
        let p = StyleProfile::default();
        assert_eq!(p.page.width_px(), 794.0);
        assert_eq!(p.page.height_px(), 1123.0);
    }

    #[test]
    fn compact_keeps_single_column_geometry() {
        let c = StyleProfile::compact();
        let s = StyleProfile::single_column();
        assert_eq!(c.page, s.page);
        assert_eq!(c.type_scale.item_description.size, "11px");
        assert_eq!(c.type_scale.section_border_width, "0.75px");
    }

    #[test]
    fn variables_use_theme_color() {
        let css = to_variables(&StyleProfile::two_column(), Some("#ff0000"));
        assert!(css.starts_with(":root {"));
        assert!(css.contains("--pdf-color-primary: #ff0000;"));
        assert!(css.contains("--pdf-sidebar-width: 35%;"));
    }

    #[test]
    fn unsafe_theme_color_is_rejected() {
        let css = to_variables(&StyleProfile::default(), Some("red} body{display:none"));
        assert!(css.contains("--pdf-color-primary: #2563eb;"));
        assert!(!css.contains("display:none"));
    }

    #[test]
    fn overrides_merge_deeply() {
        let p = StyleProfile::default()
            .apply_overrides(&json!({
                "colors": { "primary": "#111111" },
                "page": { "margins_mm": { "bottom": 10.0 } }
            }))
            .unwrap();
        assert_eq!(p.colors.primary, "#111111");
        assert_eq!(p.colors.border, "#e5e7eb");
        assert_eq!(p.page.margins_mm.bottom, 10.0);
        assert_eq!(p.page.width_mm, 210.0);
    }

    #[test]
    fn malformed_overrides_are_config_errors() {
        let err = StyleProfile::default()
            .apply_overrides(&json!({ "page": { "width_mm": "wide" } }))
            .unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
        assert!(StyleProfile::default().apply_overrides(&json!([1])).is_err());
    }

    #[test]
    fn base_stylesheet_is_print_safe() {
        let css = to_base_stylesheet(&StyleProfile::default());
        assert!(css.contains("@page { size: 210mm 297mm;"));
        assert!(css.contains("print-color-adjust: exact"));
        assert!(css.contains("list-style-type: disc"));
        assert!(css.contains("display: none !important"));
    }
}
