//! Character encoding detection for saved pages
//!
//! Saved article pages are usually UTF-8, but pages re-saved by older
//! browsers or mirrored through other tools can carry legacy encodings.
//!
//! # Detection Cascade
//!
//! 1. **Byte order mark**: a leading UTF-8 BOM settles the question
//! 2. **Caller hint**: a Content-Type value (`text/html; charset=GBK`) or a bare label (`gbk`)
//! 3. **HTML Meta Tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//! 4. **Default to UTF-8**
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::charset::detect_charset;
//!
//! let charset = detect_charset(Some("gbk"), b"<html>...</html>");
//! assert_eq!(charset, "GBK");
//!
//! let html = b"<html><head><meta charset=\"UTF-8\"></head></html>";
//! assert_eq!(detect_charset(None, html), "UTF-8");
//!
//! assert_eq!(detect_charset(None, b"<p>plain</p>"), "UTF-8");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Default charset when detection fails
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for meta charset tags
const META_SCAN_LIMIT: usize = 1024;

/// UTF-8 byte order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Detect character encoding using the cascade described in the module docs
///
/// Always returns a charset name, upper-cased.
pub fn detect_charset(hint: Option<&str>, html: &[u8]) -> String {
    if html.starts_with(UTF8_BOM) {
        return DEFAULT_CHARSET.to_string();
    }

    if let Some(hint) = hint
        && let Some(charset) = extract_charset_from_hint(hint)
    {
        return normalize_charset(&charset);
    }

    if let Some(charset) = extract_charset_from_html(html) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// Extract a charset from a caller-supplied hint
///
/// Accepts either a full Content-Type value or a bare encoding label.
///
/// ```rust
/// use wechat_markdown::charset::extract_charset_from_hint;
///
/// assert_eq!(
///     extract_charset_from_hint("text/html; charset=\"GB2312\""),
///     Some("GB2312".to_string())
/// );
/// assert_eq!(extract_charset_from_hint("big5"), Some("big5".to_string()));
/// assert_eq!(extract_charset_from_hint("text/html"), None);
/// assert_eq!(extract_charset_from_hint("  "), None);
/// ```
pub fn extract_charset_from_hint(hint: &str) -> Option<String> {
    static CHARSET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex =
        CHARSET_REGEX.get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok());
    let regex = regex.as_ref()?;

    if let Some(m) = regex.captures(hint).and_then(|caps| caps.get(1)) {
        return Some(m.as_str().to_string());
    }

    // Bare label such as "gbk" or "utf-8"
    let label = hint.trim();
    if label.is_empty() || label.contains(['/', ';', '=', ' ']) {
        return None;
    }
    Some(label.to_string())
}

/// Extract charset from HTML meta tags
///
/// Only the first 1024 bytes are scanned; meta charset declarations belong
/// early in `<head>`.
///
/// ```rust
/// use wechat_markdown::charset::extract_charset_from_html;
///
/// let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=GBK\">";
/// assert_eq!(extract_charset_from_html(html), Some("GBK".to_string()));
/// assert_eq!(extract_charset_from_html(b"<p>none</p>"), None);
/// ```
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let scan_limit = std::cmp::min(html.len(), META_SCAN_LIMIT);
    let html_str = String::from_utf8_lossy(&html[..scan_limit]);

    static HTML5_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html5_regex = HTML5_REGEX
        .get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*["']?([^"';>\s/]+)"#).ok());
    let html5_regex = html5_regex.as_ref()?;

    if let Some(m) = html5_regex.captures(&html_str).and_then(|caps| caps.get(1)) {
        return Some(m.as_str().to_string());
    }

    static HTML4_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html4_regex = HTML4_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)<meta\s+http-equiv\s*=\s*["']?Content-Type["']?\s+content\s*=\s*["']?[^"'>]*charset\s*=\s*([^"';>\s]+)"#,
        )
        .ok()
    });
    let html4_regex = html4_regex.as_ref()?;

    html4_regex
        .captures(&html_str)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize charset name to uppercase
pub fn normalize_charset(charset: &str) -> String {
    charset.trim().to_uppercase()
}
