//! wechat-markdown - convert a saved WeChat article page into Markdown

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wechat_markdown::converter::ConversionOptions;
use wechat_markdown::pipeline::{PipelineOptions, convert_file};

#[derive(Parser)]
#[command(name = "wechat-markdown")]
#[command(version, about = "Convert a saved WeChat article page into clean Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    wechat-markdown article.html article.md
    wechat-markdown --charset gbk old.html notes/old.md

Set RUST_LOG=debug to see which selectors matched and which paragraphs became headings.")]
struct Cli {
    /// Saved HTML page
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Markdown file to write (parent directories are created)
    #[arg(value_name = "DESTINATION")]
    destination: PathBuf,

    /// Charset of the page, as a label or a Content-Type value
    #[arg(long, value_name = "LABEL")]
    charset: Option<String>,

    /// Keep every paragraph a paragraph instead of inferring headings
    #[arg(long)]
    no_heading_inference: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr; the Markdown goes to a file
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = PipelineOptions {
        content_type: cli.charset.clone(),
        conversion: ConversionOptions {
            infer_headings: !cli.no_heading_inference,
            ..Default::default()
        },
        ..Default::default()
    };

    convert_file(&cli.source, &cli.destination, &options).with_context(|| {
        format!(
            "failed to convert {} to {}",
            cli.source.display(),
            cli.destination.display()
        )
    })
}
