//! End-to-end conversion of saved pages
//!
//! Ties the pieces together:
//!
//! 1. lenient parse with charset detection ([`crate::parser`])
//! 2. title and body location ([`crate::extract`])
//! 3. in-place cleanup of the body ([`crate::sanitizer`])
//! 4. Markdown rendering ([`crate::converter`])
//!
//! Only file I/O can fail; a page that cannot be decoded or has no
//! recognizable structure still produces a (possibly empty) document.
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::pipeline::{PipelineOptions, html_to_markdown};
//!
//! let html = br#"<html><body>
//!   <h1 id="activity-name">My Post</h1>
//!   <div id="js_content"><h2>Intro</h2><p>Read <a href="https://t.example/?sn=1">this</a>.</p></div>
//! </body></html>"#;
//!
//! let markdown = html_to_markdown(html, &PipelineOptions::default());
//! assert_eq!(markdown, "# My Post\n\n## Intro\n\nRead this.\n");
//! ```

use markup5ever_rcdom::RcDom;
use std::fs;
use std::path::Path;

use crate::converter::{ConversionOptions, MarkdownConverter};
use crate::error::ConversionError;
use crate::extract::Article;
use crate::parser::parse_html_lenient;
use crate::sanitizer::Sanitizer;

/// When inline `style` attributes are removed relative to conversion
///
/// Font sizes live in `style` attributes. Stripping them before the
/// converter runs leaves the heading classifier with the bold ratio as its
/// only signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StyleStripping {
    /// Keep `style` while converting, strip it afterwards
    #[default]
    AfterConversion,
    /// Strip `style` together with every other attribute before converting
    BeforeConversion,
}

/// Options for converting a whole saved page
///
/// ```rust
/// use wechat_markdown::pipeline::PipelineOptions;
///
/// let mut options = PipelineOptions::default();
/// options.content_type = Some("gbk".to_string());
/// options.conversion.infer_headings = false;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Charset hint: a Content-Type value or a bare encoding label
    pub content_type: Option<String>,
    /// When `style` attributes are stripped
    pub style_stripping: StyleStripping,
    /// Options handed to the converter
    pub conversion: ConversionOptions,
}

/// Convert the bytes of a saved page to Markdown
pub fn html_to_markdown(html: &[u8], options: &PipelineOptions) -> String {
    let dom = parse_html_lenient(html, options.content_type.as_deref());
    convert_dom(&dom, options)
}

/// Convert an already parsed page to Markdown
///
/// The located article body is sanitized in place, so `dom` is modified.
pub fn convert_dom(dom: &RcDom, options: &PipelineOptions) -> String {
    let article = Article::locate(dom);
    let sanitizer = Sanitizer::new();
    sanitizer.sanitize(&article.content);

    if options.style_stripping == StyleStripping::BeforeConversion {
        sanitizer.strip_styles(&article.content);
    }

    let converter = MarkdownConverter::with_options(options.conversion.clone());
    let markdown = converter.convert(&article.content, &article.title);

    if options.style_stripping == StyleStripping::AfterConversion {
        sanitizer.strip_styles(&article.content);
    }

    markdown
}

/// Convert a saved page on disk and write the Markdown next to it
///
/// Missing parent directories of `dst` are created. The output is UTF-8.
///
/// # Errors
///
/// Returns `ConversionError::Io` naming the file when reading `src`,
/// creating the directories of `dst` or writing `dst` fails.
pub fn convert_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    options: &PipelineOptions,
) -> Result<(), ConversionError> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let span = tracing::info_span!("convert_file", src = %src.display(), dst = %dst.display());
    let _enter = span.enter();

    let html = fs::read(src).map_err(|e| ConversionError::io(src, e))?;
    let markdown = html_to_markdown(&html, options);

    if let Some(parent) = dst.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ConversionError::io(parent, e))?;
    }
    fs::write(dst, markdown.as_bytes()).map_err(|e| ConversionError::io(dst, e))?;

    tracing::info!(bytes = markdown.len(), "markdown written");
    Ok(())
}
