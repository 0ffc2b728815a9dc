//! Heading inference for untyped paragraphs
//!
//! Article editors mark section titles visually (bold runs, larger inline
//! font sizes) instead of using `<h2>`..`<h4>`. The classifier recovers a
//! heading level from those cues, conservatively: long or empty runs are
//! always body text.
//!
//! # Rules
//!
//! A paragraph is a candidate when its visible text is 1..=60 characters
//! long and it is either mostly bold (ratio >= 0.85) or declares a font of
//! at least 16px. Candidates are then matched against [`LEVEL_RULES`] top
//! to bottom, first match wins:
//!
//! | Rule | Level |
//! |---|---|
//! | font >= 22px | 2 |
//! | font >= 18px | 3 |
//! | bold >= 0.95 and <= 30 chars | 3 |
//! | bold >= 0.85 and <= 20 chars | 4 |
//!
//! A candidate that matches no rule stays a paragraph.
//!
//! ```rust
//! use wechat_markdown::heading::{HeadingSignals, classify_signals};
//!
//! let signals = HeadingSignals { text_chars: 12, bold_ratio: 0.0, max_font_px: 24.0 };
//! assert_eq!(classify_signals(&signals), Some(2));
//! ```

use markup5ever_rcdom::Handle;

use crate::dom::{self, TagKind, Walk};
use crate::style;

/// Longer visible text is never a heading
pub const MAX_HEADING_CHARS: usize = 60;

/// Bold ratio that makes a paragraph a heading candidate
pub const BOLD_CANDIDATE_RATIO: f64 = 0.85;

/// Font size that makes a paragraph a heading candidate
pub const FONT_CANDIDATE_PX: f64 = 16.0;

/// Visual cues measured on a paragraph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSignals {
    /// Visible text length in characters
    pub text_chars: usize,
    /// Characters covered by `strong`/`b` over all visible characters
    pub bold_ratio: f64,
    /// Largest inline font size in pixel-equivalents, 0 when undeclared
    pub max_font_px: f64,
}

impl HeadingSignals {
    fn is_candidate(&self) -> bool {
        self.bold_ratio >= BOLD_CANDIDATE_RATIO || self.max_font_px >= FONT_CANDIDATE_PX
    }
}

/// One entry of the ordered level table
pub struct LevelRule {
    /// Human-readable condition, used in debug logs
    pub name: &'static str,
    /// Markdown heading level assigned on match
    pub level: u8,
    /// Condition on the measured signals
    pub applies: fn(&HeadingSignals) -> bool,
}

/// Level rules, evaluated in order; ranges overlap so order matters
pub const LEVEL_RULES: &[LevelRule] = &[
    LevelRule {
        name: "font >= 22px",
        level: 2,
        applies: |s| s.max_font_px >= 22.0,
    },
    LevelRule {
        name: "font >= 18px",
        level: 3,
        applies: |s| s.max_font_px >= 18.0,
    },
    LevelRule {
        name: "bold >= 0.95, <= 30 chars",
        level: 3,
        applies: |s| s.bold_ratio >= 0.95 && s.text_chars <= 30,
    },
    LevelRule {
        name: "bold >= 0.85, <= 20 chars",
        level: 4,
        applies: |s| s.bold_ratio >= 0.85 && s.text_chars <= 20,
    },
];

/// Measure the heading cues of a paragraph-like element
///
/// Returns `None` when the visible text is empty or longer than
/// [`MAX_HEADING_CHARS`]; such runs are body text without further checks.
pub fn measure(node: &Handle) -> Option<HeadingSignals> {
    let text_chars = dom::visible_text(node).chars().count();
    if text_chars == 0 || text_chars > MAX_HEADING_CHARS {
        return None;
    }

    let bold_chars = bold_text(node).chars().count();
    let bold_ratio = bold_chars as f64 / text_chars.max(1) as f64;

    Some(HeadingSignals {
        text_chars,
        bold_ratio,
        max_font_px: style::max_font_px(node),
    })
}

/// Concatenated visible text of every `strong`/`b` descendant
///
/// Nested bold elements are counted again, so the ratio can exceed 1.
fn bold_text(node: &Handle) -> String {
    let mut bold = String::new();
    let _ = dom::walk_descendants(node, &mut |child| match TagKind::of(child) {
        Some(TagKind::HardDrop) => Walk::SkipChildren,
        Some(TagKind::Strong) => {
            bold.push_str(&dom::visible_text(child));
            Walk::Continue
        }
        _ => Walk::Continue,
    });
    bold
}

/// Pick a heading level for measured signals
pub fn classify_signals(signals: &HeadingSignals) -> Option<u8> {
    if !signals.is_candidate() {
        return None;
    }
    let rule = LEVEL_RULES.iter().find(|rule| (rule.applies)(signals))?;
    tracing::trace!(rule = rule.name, level = rule.level, "heading rule matched");
    Some(rule.level)
}

/// Decide whether a paragraph is really a heading, and at which level (2..=4)
pub fn classify(node: &Handle) -> Option<u8> {
    measure(node).and_then(|signals| classify_signals(&signals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SimpleSelector;
    use crate::parser::parse_html;
    use proptest::prelude::*;

    fn classify_html(html: &str) -> Option<u8> {
        let dom = parse_html(html.as_bytes()).expect("Parse failed");
        let p = SimpleSelector::parse("p")
            .and_then(|selector| selector.find_first(&dom.document))
            .expect("paragraph present");
        classify(&p)
    }

    fn signals(text_chars: usize, bold_ratio: f64, max_font_px: f64) -> HeadingSignals {
        HeadingSignals {
            text_chars,
            bold_ratio,
            max_font_px,
        }
    }

    #[test]
    fn test_plain_paragraph_is_not_heading() {
        assert_eq!(classify_html("<p>Just some text</p>"), None);
    }

    #[test]
    fn test_empty_paragraph_is_not_heading() {
        assert_eq!(classify_html("<p> <b> </b> </p>"), None);
    }

    #[test]
    fn test_fully_bold_short_is_level_3() {
        assert_eq!(classify_html("<p><strong>Bold Short</strong></p>"), Some(3));
    }

    #[test]
    fn test_mostly_bold_short_is_level_4() {
        // 17 of 19 visible characters bold
        assert_eq!(
            classify_html("<p><b>Chapter one heads</b> x</p>"),
            Some(4)
        );
    }

    #[test]
    fn test_font_sizes_promote_levels() {
        let html = |px: u32| format!(r#"<p><span style="font-size: {px}px"><strong>Bold Short</strong></span></p>"#);
        assert_eq!(classify_html(&html(20)), Some(3));
        assert_eq!(classify_html(&html(23)), Some(2));
    }

    #[test]
    fn test_large_font_without_bold() {
        assert_eq!(
            classify_html(r#"<p><span style="font-size: 16pt">Section title</span></p>"#),
            Some(3)
        );
        assert_eq!(
            classify_html(r#"<p style="font-size:22px">A long-ish but acceptable title</p>"#),
            Some(2)
        );
    }

    #[test]
    fn test_candidate_without_matching_rule_is_rejected() {
        // 17px is a candidate, but not bold and below every font rule
        assert_eq!(
            classify_html(r#"<p><span style="font-size: 17px">Slightly larger</span></p>"#),
            None
        );
    }

    #[test]
    fn test_long_bold_text_is_never_heading() {
        let text = "x".repeat(70);
        let html = format!(r#"<p><span style="font-size: 30px"><b>{text}</b></span></p>"#);
        assert_eq!(classify_html(&html), None);
    }

    #[test]
    fn test_sixty_chars_is_still_candidate() {
        let text = "y".repeat(60);
        let html = format!(r#"<p style="font-size: 24px">{text}</p>"#);
        assert_eq!(classify_html(&html), Some(2));
    }

    #[test]
    fn test_bold_ratio_counts_characters_not_bytes() {
        // "第一部分 a" is six characters, four of them bold
        assert_eq!(classify_html("<p><b>第一部分</b>a</p>"), None);
        assert_eq!(classify_html("<p><b>第一部分</b></p>"), Some(3));
    }

    #[test]
    fn test_rule_order_font_wins_over_ratio() {
        assert_eq!(classify_signals(&signals(10, 1.0, 22.0)), Some(2));
        assert_eq!(classify_signals(&signals(10, 1.0, 18.0)), Some(3));
        assert_eq!(classify_signals(&signals(25, 0.96, 0.0)), Some(3));
        assert_eq!(classify_signals(&signals(25, 0.9, 0.0)), None);
        assert_eq!(classify_signals(&signals(20, 0.9, 0.0)), Some(4));
    }

    proptest! {
        #[test]
        fn prop_levels_stay_in_range(
            text_chars in 1usize..=60,
            bold_ratio in 0.0f64..1.5,
            max_font_px in 0.0f64..40.0,
        ) {
            if let Some(level) = classify_signals(&signals(text_chars, bold_ratio, max_font_px)) {
                prop_assert!((2..=4).contains(&level));
            }
        }

        #[test]
        fn prop_non_candidates_are_rejected(
            text_chars in 1usize..=60,
            bold_ratio in 0.0f64..0.85,
            max_font_px in 0.0f64..16.0,
        ) {
            prop_assert_eq!(classify_signals(&signals(text_chars, bold_ratio, max_font_px)), None);
        }

        #[test]
        fn prop_larger_font_never_lowers_heading(
            text in "[a-zA-Z]{1,20}",
            px in 16u32..30,
        ) {
            let small = classify_html(&format!(r#"<p><span style="font-size: {px}px">{text}</span></p>"#));
            let large = classify_html(&format!(r#"<p><span style="font-size: {}px">{text}</span></p>"#, px + 4));
            // A lower level number means a more prominent heading
            prop_assert!(large.unwrap_or(u8::MAX) <= small.unwrap_or(u8::MAX));
        }
    }
}
