//! WeChat Markdown - saved article pages to clean Markdown
//!
//! This library turns a WeChat public-account article, saved as an HTML
//! page, into a small and predictable Markdown document. Images, embeds and
//! link targets are dropped; headings, paragraphs, emphasis, lists, quotes,
//! code and tables are kept.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `charset`: Character encoding detection for saved pages
//! - `parser`: HTML5 parsing using html5ever, strict and lenient
//! - `dom`: Read-only queries over the parsed tree
//! - `extract`: Title and article body location
//! - `sanitizer`: In-place cleanup of the article body
//! - `style`: Inline `font-size` extraction
//! - `heading`: Heading inference for untyped paragraphs
//! - `normalize`: Whitespace normalization
//! - `converter`: Markdown generation from the DOM tree
//! - `pipeline`: End-to-end conversion of bytes and files
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::{PipelineOptions, html_to_markdown};
//!
//! let html = br#"<h1 id="activity-name">Notes</h1>
//! <div id="js_content"><p><strong>Setup</strong></p><ul><li>one</li><li>two</li></ul></div>"#;
//!
//! let markdown = html_to_markdown(html, &PipelineOptions::default());
//! assert_eq!(markdown, "# Notes\n\n### Setup\n\n- one\n- two\n");
//! ```

// Module declarations
pub mod charset;
pub mod converter;
pub mod dom;
pub mod error;
pub mod extract;
pub mod heading;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod sanitizer;
pub mod style;

// Re-export main types for convenience
pub use converter::{ConversionOptions, MarkdownConverter};
pub use error::ConversionError;
pub use parser::{parse_html, parse_html_lenient};
pub use pipeline::{PipelineOptions, StyleStripping, convert_file, html_to_markdown};
