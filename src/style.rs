//! Style resolver – reads the geometry-relevant subset of an element's styling
//! from its Tailwind-like utility classes and its inline `style` attribute,
//! and edits inline declarations in place.
//!
//! Only what the normalizer needs is resolved: display and flex flow, widths,
//! gap, padding, background, opacity and transforms. Text styling is left to
//! the captured stylesheet.

use crate::dom::ElementNode;

/// CSS reference pixels per millimetre (96 DPI).
pub const PX_PER_MM: f32 = 96.0 / 25.4;
/// CSS reference pixels per point.
pub const PX_PER_PT: f32 = 96.0 / 72.0;
/// Root font size assumed for `rem`/`em`.
pub const PX_PER_REM: f32 = 16.0;
/// One Tailwind spacing step.
const TAILWIND_UNIT_PX: f32 = 4.0;

/// Resolved geometry for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub display: Display,
    pub flex_direction: FlexDirection,
    /// `row-reverse` / `column-reverse`.
    pub flex_reverse: bool,
    pub flex_wrap: FlexWrap,
    pub width: Dimension,
    pub max_width: Dimension,
    pub flex_basis: Dimension,
    /// Column gap.
    pub gap: Dimension,
    pub padding: Edges,
    pub background: Option<Color>,
    pub opacity: Option<f32>,
    pub transform: Transform,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_reverse: false,
            flex_wrap: FlexWrap::NoWrap,
            width: Dimension::Auto,
            max_width: Dimension::Auto,
            flex_basis: Dimension::Auto,
            gap: Dimension::Px(0.0),
            padding: Edges::default(),
            background: None,
            opacity: None,
            transform: Transform::None,
        }
    }
}

impl ResolvedStyle {
    /// The width the author asked for: `width` if set, else `flex-basis`.
    pub fn authored_width(&self) -> Dimension {
        match self.width {
            Dimension::Auto => self.flex_basis,
            w => w,
        }
    }

    /// True when the element paints an opaque background distinct from a
    /// white page.
    pub fn has_panel_background(&self) -> bool {
        self.background
            .map(|c| !c.is_transparent() && !c.is_white())
            .unwrap_or(false)
    }

    pub fn is_flex_row(&self) -> bool {
        self.display == Display::Flex && self.flex_direction == FlexDirection::Row
    }
}

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Grid,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
}

/// How an element is transformed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    None,
    /// Only `scale*()`/`translate*()` functions: fit-to-viewport geometry.
    ScaleOrTranslate,
    /// Anything else (rotation, skew, matrices): decorative, left alone.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

impl Dimension {
    /// Resolve against a percentage basis in px.
    pub fn to_px(&self, basis: f32) -> Option<f32> {
        match *self {
            Dimension::Auto => None,
            Dimension::Px(px) => Some(px),
            Dimension::Percent(p) => Some(basis * p / 100.0),
        }
    }
}

/// Four box edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

impl Default for Edges {
    fn default() -> Self {
        Self {
            top: Dimension::Px(0.0),
            right: Dimension::Px(0.0),
            bottom: Dimension::Px(0.0),
            left: Dimension::Px(0.0),
        }
    }
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    /// Stand-in for paints whose exact value is unknown (palette shades
    /// outside the table, gradients, images). Only its opacity matters.
    pub const OPAQUE_UNKNOWN: Self = Self {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn is_white(&self) -> bool {
        self.a > 0.999 && self.r > 0.999 && self.g > 0.999 && self.b > 0.999
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        let short = |i: usize| channel(&hex[i..i + 1].repeat(2));
        match hex.len() {
            3 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: 1.0,
            }),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: 1.0,
            }),
            8 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Parse a CSS colour value.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_ascii_lowercase();
        if v.starts_with('#') {
            return Self::from_hex(&v);
        }
        if let Some(args) = function_args(&v, &["rgba", "rgb"]) {
            return parse_rgb_args(args);
        }
        if let Some(args) = function_args(&v, &["hsla", "hsl"]) {
            let alpha = split_color_args(args)
                .get(3)
                .and_then(|a| parse_alpha(a))
                .unwrap_or(1.0);
            return Some(Self::OPAQUE_UNKNOWN.with_alpha(alpha));
        }
        match v.as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "red" => Some(Self {
                r: 1.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            }),
            "navy" | "blue" | "green" | "gray" | "grey" | "silver" | "teal" | "purple"
            | "orange" | "maroon" | "olive" | "whitesmoke" | "ghostwhite" | "aliceblue" => {
                Some(Self::OPAQUE_UNKNOWN)
            }
            _ => None,
        }
    }
}

fn function_args<'a>(v: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        v.strip_prefix(name)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
    })
}

fn split_color_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts = split_color_args(args);
    if parts.len() < 3 {
        return None;
    }
    let channel = |s: &str| -> Option<f32> {
        match s.strip_suffix('%') {
            Some(p) => p.parse::<f32>().ok().map(|v| v / 100.0),
            None => s.parse::<f32>().ok().map(|v| v / 255.0),
        }
    };
    Some(Color {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: parts.get(3).and_then(|a| parse_alpha(a)).unwrap_or(1.0),
    })
}

fn parse_alpha(s: &str) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(p) => p.parse::<f32>().ok().map(|v| v / 100.0),
        None => s.parse().ok(),
    }
}

/// Extract the painted colour of a `background` shorthand.
fn parse_background(value: &str) -> Option<Color> {
    let v = value.trim().to_ascii_lowercase();
    if v == "none" {
        return Some(Color::TRANSPARENT);
    }
    if v.contains("gradient(") || v.contains("url(") {
        return Some(Color::OPAQUE_UNKNOWN);
    }
    if let Some(c) = Color::parse(&v) {
        return Some(c);
    }
    // Colour functions contain spaces, so try them before splitting.
    for name in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(start) = v.find(name) {
            if let Some(len) = v[start..].find(')') {
                return Color::parse(&v[start..start + len + 1]);
            }
        }
    }
    v.split_whitespace().find_map(Color::parse)
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the geometry of an element: utility classes first, then the
/// inline style, which wins.
pub fn resolve_style(element: &ElementNode) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();
    if element.tag.is("span") || element.tag.is("a") {
        style.display = Display::Inline;
    }

    for class in element.classes() {
        if let Some(utility) = applicable_utility(class) {
            apply_tailwind_class(&mut style, utility);
        }
    }

    if let Some(inline) = element.inline_style() {
        for decl in StyleDeclarations::parse(inline).iter() {
            apply_css_property(&mut style, &decl.property, &decl.value);
        }
    }

    style
}

/// Strip responsive prefixes (the preview renders at desktop width) and
/// discard state-dependent variants that never apply to a static snapshot.
fn applicable_utility(class: &str) -> Option<&str> {
    let mut rest = class;
    while let Some((prefix, tail)) = rest.split_once(':') {
        match prefix {
            "sm" | "md" | "lg" | "xl" | "2xl" => rest = tail,
            _ => return None,
        }
    }
    Some(rest)
}

/// Apply a single Tailwind utility class.
fn apply_tailwind_class(s: &mut ResolvedStyle, class: &str) {
    match class {
        // Display
        "flex" | "inline-flex" => s.display = Display::Flex,
        "grid" | "inline-grid" => s.display = Display::Grid,
        "block" | "inline-block" => s.display = Display::Block,
        "inline" => s.display = Display::Inline,
        "hidden" => s.display = Display::None,

        // Flex direction
        "flex-row" | "flex-row-reverse" => {
            s.flex_direction = FlexDirection::Row;
            s.flex_reverse = class.ends_with("-reverse");
        }
        "flex-col" | "flex-col-reverse" => {
            s.flex_direction = FlexDirection::Column;
            s.flex_reverse = class.ends_with("-reverse");
        }

        // Flex wrap
        "flex-wrap" | "flex-wrap-reverse" => s.flex_wrap = FlexWrap::Wrap,
        "flex-nowrap" => s.flex_wrap = FlexWrap::NoWrap,

        // Background
        "bg-transparent" => s.background = Some(Color::TRANSPARENT),
        "bg-white" => s.background = Some(Color::WHITE),
        "bg-black" => s.background = Some(Color::BLACK),

        _ => {
            // Dynamic patterns
            try_parse_spacing_class(s, class);
            try_parse_gap_class(s, class);
            try_parse_width_class(s, class);
            try_parse_color_class(s, class);
            try_parse_opacity_class(s, class);
            try_parse_transform_class(s, class);
        }
    }
}

/// Value of a sizing utility suffix: `4`, `1.5`, `1/3`, `full`, `[35%]`.
fn utility_dimension(value: &str) -> Option<Dimension> {
    if let Some(arbitrary) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return match parse_dimension(&arbitrary.replace('_', " ")) {
            Dimension::Auto => None,
            d => Some(d),
        };
    }
    match value {
        "full" => return Some(Dimension::Percent(100.0)),
        "auto" => return Some(Dimension::Auto),
        "px" => return Some(Dimension::Px(1.0)),
        "0" => return Some(Dimension::Px(0.0)),
        _ => {}
    }
    if let Some((num, den)) = value.split_once('/') {
        let num: f32 = num.parse().ok()?;
        let den: f32 = den.parse().ok()?;
        if den > 0.0 {
            return Some(Dimension::Percent(num / den * 100.0));
        }
        return None;
    }
    value
        .parse::<f32>()
        .ok()
        .map(|v| Dimension::Px(v * TAILWIND_UNIT_PX))
}

fn try_parse_spacing_class(s: &mut ResolvedStyle, class: &str) {
    // p-{n}, px-{n}, py-{n}, pt-{n}, pr-{n}, pb-{n}, pl-{n}
    let Some((prefix, value)) = class.split_once('-') else {
        return;
    };
    if !matches!(prefix, "p" | "px" | "py" | "pt" | "pr" | "pb" | "pl") {
        return;
    }
    let Some(v) = utility_dimension(value) else {
        return;
    };
    match prefix {
        "p" => {
            s.padding = Edges {
                top: v,
                right: v,
                bottom: v,
                left: v,
            }
        }
        "px" => {
            s.padding.left = v;
            s.padding.right = v;
        }
        "py" => {
            s.padding.top = v;
            s.padding.bottom = v;
        }
        "pt" => s.padding.top = v,
        "pr" => s.padding.right = v,
        "pb" => s.padding.bottom = v,
        "pl" => s.padding.left = v,
        _ => {}
    }
}

fn try_parse_gap_class(s: &mut ResolvedStyle, class: &str) {
    let rest = match class.strip_prefix("gap-x-") {
        Some(r) => r,
        None => match class.strip_prefix("gap-") {
            Some(r) if !r.starts_with("y-") => r,
            _ => return,
        },
    };
    if let Some(d) = utility_dimension(rest) {
        s.gap = d;
    }
}

fn try_parse_width_class(s: &mut ResolvedStyle, class: &str) {
    if let Some(rest) = class.strip_prefix("max-w-") {
        s.max_width = match rest {
            "none" => Dimension::Auto,
            _ => utility_dimension(rest).unwrap_or(s.max_width),
        };
    } else if let Some(rest) = class.strip_prefix("w-") {
        if let Some(d) = utility_dimension(rest) {
            s.width = d;
        }
    } else if let Some(rest) = class.strip_prefix("basis-") {
        if let Some(d) = utility_dimension(rest) {
            s.flex_basis = d;
        }
    }
}

fn try_parse_color_class(s: &mut ResolvedStyle, class: &str) {
    let Some(rest) = class.strip_prefix("bg-") else {
        return;
    };
    // Utilities that share the bg- prefix but paint nothing themselves.
    const NON_PAINT: &[&str] = &[
        "cover", "contain", "center", "top", "bottom", "left", "right", "fixed", "local",
        "scroll", "repeat", "no-repeat", "none", "clip", "origin", "opacity", "blend",
    ];
    if NON_PAINT.iter().any(|p| rest.starts_with(p)) {
        return;
    }
    if rest.starts_with("gradient") {
        s.background = Some(Color::OPAQUE_UNKNOWN);
        return;
    }

    let (name, alpha) = match rest.rsplit_once('/') {
        Some((n, a)) if !n.starts_with('[') => (n, a.parse::<f32>().ok().map(|v| v / 100.0)),
        _ => (rest, None),
    };

    let color = if let Some(arbitrary) = name.strip_prefix('[').and_then(|v| v.strip_suffix(']'))
    {
        Color::parse(&arbitrary.replace('_', " "))
    } else {
        palette_color(name)
    };

    if let Some(c) = color {
        s.background = Some(match alpha {
            Some(a) => c.with_alpha(a),
            None => c,
        });
    }
}

/// Tailwind colour subset; other `{hue}-{shade}` names resolve to an opaque
/// colour of unknown value.
fn palette_color(name: &str) -> Option<Color> {
    let hex = match name {
        "slate-50" => "#f8fafc",
        "slate-100" => "#f1f5f9",
        "gray-50" => "#f9fafb",
        "gray-100" => "#f3f4f6",
        "gray-200" => "#e5e7eb",
        "gray-800" => "#1f2937",
        "gray-900" => "#111827",
        "blue-50" => "#eff6ff",
        "blue-600" => "#2563eb",
        "blue-900" => "#1e3a8a",
        "white" => "#ffffff",
        "black" => "#000000",
        "transparent" => return Some(Color::TRANSPARENT),
        _ => {
            let (hue, shade) = name.rsplit_once('-')?;
            let valid_hue = !hue.is_empty() && hue.chars().all(|c| c.is_ascii_lowercase());
            return (valid_hue && shade.parse::<u16>().is_ok()).then_some(Color::OPAQUE_UNKNOWN);
        }
    };
    Color::from_hex(hex)
}

fn try_parse_opacity_class(s: &mut ResolvedStyle, class: &str) {
    if let Some(rest) = class.strip_prefix("opacity-") {
        if let Ok(v) = rest.parse::<f32>() {
            s.opacity = Some(v / 100.0);
        }
    }
}

fn try_parse_transform_class(s: &mut ResolvedStyle, class: &str) {
    let class = class.trim_start_matches('-');
    if class.starts_with("scale-") || class.starts_with("translate-") {
        s.transform = Transform::ScaleOrTranslate;
    } else if class.starts_with("rotate-") || class.starts_with("skew-") {
        s.transform = Transform::Other;
    }
}

fn apply_css_property(s: &mut ResolvedStyle, prop: &str, val: &str) {
    match prop {
        "display" => {
            s.display = match val {
                "flex" | "inline-flex" => Display::Flex,
                "grid" | "inline-grid" => Display::Grid,
                "block" | "inline-block" | "list-item" => Display::Block,
                "inline" => Display::Inline,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "flex-direction" => {
            let direction = match val {
                "row" | "row-reverse" => FlexDirection::Row,
                "column" | "column-reverse" => FlexDirection::Column,
                _ => return,
            };
            s.flex_direction = direction;
            s.flex_reverse = val.ends_with("-reverse");
        }
        "flex-wrap" => {
            s.flex_wrap = match val {
                "nowrap" => FlexWrap::NoWrap,
                _ => FlexWrap::Wrap,
            }
        }
        "flex-flow" => {
            for part in val.split_whitespace() {
                apply_css_property(s, "flex-direction", part);
                if part.contains("wrap") {
                    apply_css_property(s, "flex-wrap", part);
                }
            }
        }
        "flex" => {
            // flex: <grow> <shrink> <basis>
            if let Some(basis) = val.split_whitespace().nth(2) {
                s.flex_basis = parse_dimension(basis);
            }
        }
        "flex-basis" => s.flex_basis = parse_dimension(val),
        "width" => s.width = parse_dimension(val),
        "max-width" => s.max_width = parse_dimension(val),
        "gap" => {
            // gap: <row> <column>
            let column = val.split_whitespace().last().unwrap_or(val);
            s.gap = parse_dimension(column);
        }
        "column-gap" => s.gap = parse_dimension(val),
        "padding" => apply_shorthand_spacing(val, &mut s.padding),
        "padding-top" => s.padding.top = parse_dimension(val),
        "padding-right" => s.padding.right = parse_dimension(val),
        "padding-bottom" => s.padding.bottom = parse_dimension(val),
        "padding-left" => s.padding.left = parse_dimension(val),
        "background-color" => {
            if let Some(c) = Color::parse(val) {
                s.background = Some(c);
            }
        }
        "background" => {
            if let Some(c) = parse_background(val) {
                s.background = Some(c);
            }
        }
        "opacity" => {
            if let Ok(v) = val.parse::<f32>() {
                s.opacity = Some(v);
            }
        }
        "transform" => s.transform = classify_transform(val),
        _ => {}
    }
}

/// Classify a `transform` value by the functions it uses.
pub fn classify_transform(val: &str) -> Transform {
    let v = val.trim().to_ascii_lowercase();
    if v.is_empty() || v == "none" {
        return Transform::None;
    }
    let all_fit = v
        .split(')')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .all(|f| f.starts_with("scale") || f.starts_with("translate"));
    if all_fit {
        Transform::ScaleOrTranslate
    } else {
        Transform::Other
    }
}

/// Parse a length into a [`Dimension`]; unsupported values become `Auto`.
pub fn parse_dimension(s: &str) -> Dimension {
    let s = s.trim();
    if let Some(p) = s.strip_suffix('%') {
        return p
            .trim()
            .parse::<f32>()
            .map(Dimension::Percent)
            .unwrap_or(Dimension::Auto);
    }
    parse_px(s).map(Dimension::Px).unwrap_or(Dimension::Auto)
}

/// Parse an absolute length into px.
pub fn parse_px(s: &str) -> Option<f32> {
    let s = s.trim();
    let units: [(&str, f32); 6] = [
        ("px", 1.0),
        ("rem", PX_PER_REM),
        ("em", PX_PER_REM),
        ("mm", PX_PER_MM),
        ("pt", PX_PER_PT),
        ("in", 96.0),
    ];
    for (unit, factor) in units {
        if let Some(num) = s.strip_suffix(unit) {
            return num.trim().parse::<f32>().ok().map(|v| v * factor);
        }
    }
    // Unitless zero
    match s.parse::<f32>() {
        Ok(v) if v == 0.0 => Some(0.0),
        _ => None,
    }
}

fn apply_shorthand_spacing(val: &str, edges: &mut Edges) {
    let parts: Vec<Dimension> = val.split_whitespace().map(parse_dimension).collect();
    match parts.as_slice() {
        [all] => {
            *edges = Edges {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }
        }
        [v, h] => {
            *edges = Edges {
                top: *v,
                right: *h,
                bottom: *v,
                left: *h,
            }
        }
        [t, h, b] => {
            *edges = Edges {
                top: *t,
                right: *h,
                bottom: *b,
                left: *h,
            }
        }
        [t, r, b, l] => {
            *edges = Edges {
                top: *t,
                right: *r,
                bottom: *b,
                left: *l,
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Inline declaration editing
// ---------------------------------------------------------------------------

/// One `property: value` pair of an inline style.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lower-cased property name.
    pub property: String,
    /// Value without the `!important` flag.
    pub value: String,
    pub important: bool,
}

/// The ordered declarations of an inline `style` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclarations {
    decls: Vec<Declaration>,
}

impl StyleDeclarations {
    /// Parse a `style` attribute. Semicolons inside parentheses or quotes
    /// (data URIs, `url(...)`) do not split declarations.
    pub fn parse(style: &str) -> Self {
        let mut decls = Vec::new();
        for raw in split_declarations(style) {
            let Some((prop, val)) = raw.split_once(':') else {
                continue;
            };
            let prop = prop.trim().to_ascii_lowercase();
            let mut val = val.trim();
            if prop.is_empty() || val.is_empty() {
                continue;
            }
            let mut important = false;
            if let Some(idx) = val.to_ascii_lowercase().rfind("!important") {
                important = true;
                val = val[..idx].trim_end();
            }
            decls.push(Declaration {
                property: prop,
                value: val.to_string(),
                important,
            });
        }
        Self { decls }
    }

    /// The effective value of a property (last occurrence wins).
    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .rev()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Set `property`. A single existing occurrence that no later shorthand
    /// overrides is updated in place; otherwise every occurrence is dropped
    /// and the declaration is appended so it wins over earlier shorthands.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        self.put(property, value.into(), false);
    }

    pub fn set_important(&mut self, property: &str, value: impl Into<String>) {
        self.put(property, value.into(), true);
    }

    fn put(&mut self, property: &str, value: String, important: bool) {
        let property = property.to_ascii_lowercase();
        let positions: Vec<usize> = self
            .decls
            .iter()
            .enumerate()
            .filter(|(_, d)| d.property == property)
            .map(|(i, _)| i)
            .collect();
        if let [only] = positions.as_slice() {
            let shadowed = self.decls[only + 1..]
                .iter()
                .any(|d| property.starts_with(&format!("{}-", d.property)));
            if !shadowed {
                let slot = &mut self.decls[*only];
                slot.value = value;
                slot.important = important;
                return;
            }
        }
        self.decls.retain(|d| d.property != property);
        self.decls.push(Declaration {
            property,
            value,
            important,
        });
    }

    /// Remove every occurrence of `property`; returns whether any existed.
    pub fn remove(&mut self, property: &str) -> bool {
        let before = self.decls.len();
        self.decls.retain(|d| d.property != property);
        before != self.decls.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.decls
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important", d.property, d.value)
                } else {
                    format!("{}: {}", d.property, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in style.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = (depth - 1).max(0),
            (None, ';') if depth == 0 => {
                parts.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&style[start..]);
    parts
}

/// Read-modify-write an element's inline style. An emptied style removes the
/// attribute.
pub fn edit_inline_style<F>(element: &mut ElementNode, edit: F)
where
    F: FnOnce(&mut StyleDeclarations),
{
    let mut decls = element
        .inline_style()
        .map(StyleDeclarations::parse)
        .unwrap_or_default();
    edit(&mut decls);
    if decls.is_empty() {
        element.remove_attr("style");
    } else {
        element.set_attr("style", decls.to_css());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, Node};

    fn element(html: &str) -> ElementNode {
        match parse_html(html).into_iter().next() {
            Some(Node::Element(e)) => e,
            _ => panic!("Expected element"),
        }
    }

    #[test]
    fn tailwind_padding() {
        let mut s = ResolvedStyle::default();
        apply_tailwind_class(&mut s, "p-4");
        assert_eq!(s.padding.top, Dimension::Px(16.0));
        assert_eq!(s.padding.left, Dimension::Px(16.0));
        apply_tailwind_class(&mut s, "px-[28px]");
        assert_eq!(s.padding.right, Dimension::Px(28.0));
    }

    #[test]
    fn inline_overrides_classes() {
        let e = element(r#"<div class="flex flex-col w-1/3" style="flex-direction: row; width: 35%"></div>"#);
        let s = resolve_style(&e);
        assert!(s.is_flex_row());
        assert_eq!(s.width, Dimension::Percent(35.0));
    }

    #[test]
    fn reversed_rows_stay_rows() {
        let s = resolve_style(&element(r#"<div class="flex flex-row-reverse"></div>"#));
        assert!(s.is_flex_row());
        assert!(s.flex_reverse);
        let s = resolve_style(&element(r#"<div class="flex-row-reverse" style="display: flex; flex-flow: row wrap"></div>"#));
        assert!(!s.flex_reverse);
        let s = resolve_style(&element(r#"<div style="display: flex; flex-direction: row-reverse"></div>"#));
        assert!(s.is_flex_row() && s.flex_reverse);
    }

    #[test]
    fn fraction_and_arbitrary_widths() {
        let e = element(r#"<div class="md:w-2/3"></div>"#);
        match resolve_style(&e).width {
            Dimension::Percent(p) => assert!((p - 66.666).abs() < 0.01),
            other => panic!("unexpected {other:?}"),
        }
        let e = element(r#"<div class="w-[240px] hover:w-full"></div>"#);
        assert_eq!(resolve_style(&e).width, Dimension::Px(240.0));
    }

    #[test]
    fn background_detection() {
        let panel = element(r#"<div class="bg-slate-100"></div>"#);
        assert!(resolve_style(&panel).has_panel_background());
        let white = element(r#"<div class="bg-white"></div>"#);
        assert!(!resolve_style(&white).has_panel_background());
        let clear = element(r#"<div style="background-color: rgba(0, 0, 0, 0)"></div>"#);
        assert!(!resolve_style(&clear).has_panel_background());
        let gradient = element(r#"<div style="background: linear-gradient(#fff, #000)"></div>"#);
        assert!(resolve_style(&gradient).has_panel_background());
        let shorthand = element(r#"<div style="background: rgb(30 58 138) no-repeat"></div>"#);
        assert!(resolve_style(&shorthand).has_panel_background());
    }

    #[test]
    fn color_from_hex() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!(Color::from_hex("#0000").unwrap().is_transparent());
    }

    #[test]
    fn lengths_in_physical_units() {
        assert_eq!(parse_dimension("210mm").to_px(0.0).map(f32::round), Some(794.0));
        assert_eq!(parse_px("1.5rem"), Some(24.0));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn transforms_are_classified() {
        assert_eq!(classify_transform("scale(0.75)"), Transform::ScaleOrTranslate);
        assert_eq!(
            classify_transform("translateX(-50%) scale(0.8)"),
            Transform::ScaleOrTranslate
        );
        assert_eq!(classify_transform("rotate(45deg)"), Transform::Other);
        assert_eq!(classify_transform("none"), Transform::None);
    }

    #[test]
    fn declarations_set_appends_after_shorthand() {
        let mut d = StyleDeclarations::parse("padding-left: 4px; padding: 24px; color: red");
        d.set("padding-left", "0px");
        assert_eq!(d.to_css(), "padding: 24px; color: red; padding-left: 0px");
    }

    #[test]
    fn declarations_set_in_place_when_not_shadowed() {
        let mut d = StyleDeclarations::parse("width: 10px; color: red");
        d.set_important("width", "20px");
        assert_eq!(d.to_css(), "width: 20px !important; color: red");
    }

    #[test]
    fn declarations_keep_data_uris_whole() {
        let d = StyleDeclarations::parse(
            "background-image: url('data:image/png;base64,AAAA'); width: 10px !important",
        );
        assert_eq!(d.iter().count(), 2);
        assert_eq!(d.get("width"), Some("10px"));
        assert!(d.iter().last().unwrap().important);
    }

    #[test]
    fn edit_inline_style_removes_empty_attribute() {
        let mut e = element(r#"<div style="transform: scale(0.5)"></div>"#);
        edit_inline_style(&mut e, |d| {
            d.remove("transform");
        });
        assert!(e.inline_style().is_none());
    }
}
