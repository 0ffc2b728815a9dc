//! Inline `font-size` extraction
//!
//! Article editors rarely emit real heading tags. Section titles are usually
//! paragraphs whose spans carry an inline `font-size`, so the heading
//! classifier needs a cheap way to read those sizes.

use markup5ever_rcdom::Handle;
use regex::Regex;
use std::sync::OnceLock;

use crate::dom::{self, TagKind, Walk};

/// Once a size this large is seen the search stops; no threshold is higher
pub const PROBE_CEILING_PX: f64 = 24.0;

/// Inline tags that editors decorate with `style="font-size: ..."`
const PROBE_TAGS: &[&str] = &["span", "strong", "b", "em", "i", "font"];

/// Unit of a declared font size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontUnit {
    /// CSS pixels
    Px,
    /// Typographic points
    Pt,
}

/// A `font-size` declaration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSize {
    /// Declared number
    pub value: f64,
    /// Declared unit
    pub unit: FontUnit,
}

impl FontSize {
    /// Size in pixel-equivalents
    pub fn to_px(self) -> f64 {
        match self.unit {
            FontUnit::Px => self.value,
            // 1pt = 4/3 px
            FontUnit::Pt => self.value * 4.0 / 3.0,
        }
    }
}

/// Find the first `font-size: <number><px|pt>` declaration in a style string
///
/// Case-insensitive and whitespace-tolerant. Returns `None` when nothing
/// matches or the number does not parse (`1.2.3px`).
///
/// ```rust
/// use wechat_markdown::style::{parse_font_size, FontUnit};
///
/// let size = parse_font_size("color: red; FONT-SIZE : 12pt").unwrap();
/// assert_eq!(size.unit, FontUnit::Pt);
/// assert_eq!(size.to_px(), 16.0);
/// assert!(parse_font_size("font-size: 1.2em").is_none());
/// ```
pub fn parse_font_size(style: &str) -> Option<FontSize> {
    static FONT_SIZE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = FONT_SIZE_REGEX
        .get_or_init(|| Regex::new(r"(?i)font-size\s*:\s*([0-9.]+)\s*(px|pt)").ok());
    let caps = regex.as_ref()?.captures(style)?;

    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = if caps.get(2)?.as_str().eq_ignore_ascii_case("pt") {
        FontUnit::Pt
    } else {
        FontUnit::Px
    };

    Some(FontSize { value, unit })
}

/// Declared font size of a style string in pixel-equivalents
pub fn font_size_px(style: &str) -> Option<f64> {
    parse_font_size(style).map(FontSize::to_px)
}

fn element_font_px(node: &Handle) -> f64 {
    dom::attr(node, "style")
        .and_then(|style| font_size_px(&style))
        .unwrap_or(0.0)
}

/// Largest inline font size on `node` or its styled inline descendants
///
/// Only the element itself and descendants tagged `span`, `strong`, `b`,
/// `em`, `i` or `font` are read. The scan stops as soon as a size of at
/// least [`PROBE_CEILING_PX`] is found, so it does not necessarily visit
/// every descendant. Returns 0 when nothing declares a size.
pub fn max_font_px(node: &Handle) -> f64 {
    let mut max_px = element_font_px(node);
    if max_px >= PROBE_CEILING_PX {
        return max_px;
    }

    let _ = dom::walk_descendants(node, &mut |child| {
        let Some(tag) = dom::tag_name(child) else {
            return Walk::Continue;
        };
        if TagKind::from_tag(tag) == TagKind::HardDrop {
            return Walk::SkipChildren;
        }
        if PROBE_TAGS.contains(&tag) {
            max_px = max_px.max(element_font_px(child));
            if max_px >= PROBE_CEILING_PX {
                return Walk::Stop;
            }
        }
        Walk::Continue
    });

    max_px
}
