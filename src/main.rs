//! resume-forge – export the resume preview of a saved editor page to PDF.
//!
//! Usage:
//!   resume-forge <page.html> [--profile two-column] [--output-dir out/]
//!   resume-forge <page.html> --html-only document.html --report
//!
//! The page's `<style>` blocks and local stylesheets are carried into the
//! exported document. Rendering happens in the external service at
//! `--endpoint` (or `RESUME_FORGE_ENDPOINT`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::info;

use resume_forge::config::{load_overrides, DEFAULT_ENDPOINT, DEFAULT_FILENAME, DEFAULT_PREVIEW_ID};
use resume_forge::dom::parse_html;
use resume_forge::profile::SINGLE_COLUMN;
use resume_forge::snapshot::PageStyles;
use resume_forge::{prepare_page, ExportClient, ExportConfig, PreparedDocument, Result};

#[derive(Parser, Debug)]
#[command(name = "resume-forge")]
#[command(version)]
#[command(about = "Export a live resume preview to a print-correct PDF", long_about = None)]
struct Cli {
    /// Saved editor page containing the preview element
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// `id` of the preview element
    #[arg(long, default_value = DEFAULT_PREVIEW_ID)]
    preview_id: String,

    /// Style profile: single-column, two-column or compact
    #[arg(short, long, default_value = SINGLE_COLUMN)]
    profile: String,

    /// Accent colour replacing the profile's primary colour
    #[arg(long, value_name = "COLOR")]
    theme_color: Option<String>,

    /// JSON file deep-merged over the profile
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Extra stylesheet appended after the page's own (repeatable)
    #[arg(long = "stylesheet", value_name = "CSS")]
    stylesheets: Vec<PathBuf>,

    /// Rendering service URL
    #[arg(long, env = "RESUME_FORGE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Directory the PDF is written into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Requested PDF filename; the service may suggest another
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    filename: String,

    /// Write the assembled HTML here instead of rendering
    #[arg(long, value_name = "FILE")]
    html_only: Option<PathBuf>,

    /// Print a JSON report of the sanitizer and normalizer passes
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let html = fs::read_to_string(&cli.page)?;
    let page = parse_html(&html);

    let base_dir = cli.page.parent().filter(|p| !p.as_os_str().is_empty());
    let snapshot = cli
        .stylesheets
        .iter()
        .fold(PageStyles::from_page(&page, base_dir), |s, css| {
            s.with_stylesheet(css)
        });

    let config = ExportConfig {
        endpoint: cli.endpoint,
        preview_id: cli.preview_id,
        profile: cli.profile,
        theme_color: cli.theme_color,
        overrides: cli.overrides.as_deref().map(load_overrides).transpose()?,
        filename: cli.filename,
        output_dir: cli.output_dir,
    };

    let document = match &cli.html_only {
        Some(out) => {
            let document = prepare_page(&page, &config, &snapshot)?;
            write_html(out, &document)?;
            document
        }
        None => {
            let outcome = ExportClient::new(config)?.export(&page, &snapshot).await?;
            eprintln!(
                "Wrote '{}' ({} bytes)",
                outcome.path.display(),
                outcome.bytes_written
            );
            outcome.document
        }
    };

    if cli.report {
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| resume_forge::ExportError::Config(format!("cannot write report: {e}")))?;
        println!("{json}");
    }
    Ok(())
}

fn write_html(out: &Path, document: &PreparedDocument) -> Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, &document.html)?;
    info!("Wrote document to {}", out.display());
    eprintln!("Wrote '{}' ({} bytes)", out.display(), document.html.len());
    Ok(())
}
