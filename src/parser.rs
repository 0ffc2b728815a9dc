//! HTML5 parser using html5ever
//!
//! Saved article pages are frequently malformed: truncated downloads,
//! editor-generated tag soup, stray `</p>` tags. html5ever implements the
//! WHATWG parsing algorithm, so every byte sequence produces a tree the same
//! way a browser would build it.
//!
//! Two entry points are provided:
//!
//! - [`parse_html_with_charset`] is strict. It rejects empty input and bytes
//!   that are invalid for the detected charset.
//! - [`parse_html_lenient`] never fails. It tries the strict path first and
//!   degrades to a best-effort decode that drops undecodable bytes.
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::parser::{parse_html, parse_html_lenient};
//!
//! let dom = parse_html(b"<html><body><h1>Hello").expect("malformed markup still parses");
//!
//! // Invalid UTF-8 is rejected by the strict parser...
//! assert!(parse_html(b"<p>\xFF\xFE</p>").is_err());
//! // ...but the lenient parser still produces a tree
//! let dom = parse_html_lenient(b"<p>\xFF\xFE</p>", None);
//! ```

use encoding_rs::DecoderResult;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;
use std::borrow::Cow;

use crate::charset::{DEFAULT_CHARSET, UTF8_BOM, detect_charset};
use crate::error::ConversionError;

/// Parse HTML bytes into a DOM tree with charset detection
///
/// `hint` is an optional Content-Type value or bare charset label; see
/// [`crate::charset::detect_charset`] for the cascade.
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: the input is empty
/// - `ConversionError::EncodingError`: the bytes are invalid for the detected
///   charset, or the charset label is unknown
pub fn parse_html_with_charset(
    html: &[u8],
    hint: Option<&str>,
) -> Result<RcDom, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let detected_charset = detect_charset(hint, html);
    let utf8_str = decode_html_to_utf8(html, &detected_charset)?;

    Ok(parse_str(&utf8_str))
}

/// Parse HTML bytes into a DOM tree
///
/// Convenience wrapper for [`parse_html_with_charset`] without a hint.
pub fn parse_html(html: &[u8]) -> Result<RcDom, ConversionError> {
    parse_html_with_charset(html, None)
}

/// Parse HTML bytes, degrading instead of failing
///
/// When the strict parse fails the bytes are decoded best-effort: an
/// unknown charset label falls back to UTF-8 and undecodable byte
/// sequences are dropped. Empty input yields an empty document.
pub fn parse_html_lenient(html: &[u8], hint: Option<&str>) -> RcDom {
    match parse_html_with_charset(html, hint) {
        Ok(dom) => dom,
        Err(ConversionError::InvalidInput(_)) => parse_str(""),
        Err(err) => {
            tracing::warn!(error = %err, "strict parse failed, decoding leniently");
            let detected_charset = detect_charset(hint, html);
            parse_str(&decode_html_lossy(html, &detected_charset))
        }
    }
}

fn parse_str(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

fn decode_html_to_utf8<'a>(
    html: &'a [u8],
    detected_charset: &str,
) -> Result<Cow<'a, str>, ConversionError> {
    if detected_charset.eq_ignore_ascii_case(DEFAULT_CHARSET) {
        let body = html.strip_prefix(UTF8_BOM).unwrap_or(html);
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            ConversionError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {} (detected charset: {})",
                e.valid_up_to(),
                e,
                detected_charset
            ))
        });
    }

    let encoding =
        encoding_rs::Encoding::for_label(detected_charset.as_bytes()).ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Unsupported charset '{}' for HTML parsing",
                detected_charset
            ))
        })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .ok_or_else(|| {
            ConversionError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                detected_charset
            ))
        })
}

/// Best-effort decode that never fails
///
/// Undecodable sequences are dropped rather than replaced, so a few corrupt
/// bytes in a saved page do not leave replacement glyphs in the Markdown.
/// A U+FFFD that is really in the page is kept.
fn decode_html_lossy(html: &[u8], detected_charset: &str) -> String {
    let encoding = encoding_rs::Encoding::for_label(detected_charset.as_bytes())
        .unwrap_or(encoding_rs::UTF_8);
    let mut decoder = encoding.new_decoder();
    let capacity = |decoder: &encoding_rs::Decoder, len: usize| {
        decoder
            .max_utf8_buffer_length_without_replacement(len)
            .unwrap_or(len)
            .max(4)
    };

    let mut decoded = String::with_capacity(capacity(&decoder, html.len()));
    let mut remaining = html;
    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(remaining, &mut decoded, true);
        remaining = &remaining[read..];
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => {
                let additional = capacity(&decoder, remaining.len());
                decoded.reserve(additional);
            }
            // The malformed bytes are already consumed; skip them
            DecoderResult::Malformed(..) => {}
        }
    }
    decoded
}
