//! CLI binary for doc2md-client.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig`, submits one batch and prints the results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use doc2md_client::{
    ClientConfig, NoticeKind, Outcome, ResultsView, Session, StatusCallback, SubmissionStage,
    SubmissionStatusCallback, UploadFile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI status callback using indicatif ──────────────────────────────────────

/// Terminal status callback: a spinner whose message follows the
/// submission stages.
struct CliStatusCallback {
    bar: ProgressBar,
}

impl CliStatusCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("doc2md");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl SubmissionStatusCallback for CliStatusCallback {
    fn on_stage(&self, stage: &SubmissionStage) {
        match stage {
            SubmissionStage::Completed { result_count } => {
                self.bar.finish_and_clear();
                eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    bold(&stage.describe()),
                    dim(&format!("{result_count} result(s)"))
                );
            }
            SubmissionStage::Failed { message } => {
                self.bar.finish_and_clear();
                eprintln!("{} {}  {}", red("✘"), bold(&stage.describe()), red(message));
            }
            _ => self.bar.set_message(stage.describe()),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two files against a local server
  doc2md report.docx scan.pdf

  # Another server, longer timeout
  doc2md --server https://convert.example.org --timeout 600 book.pdf

  # Save the converted Markdown next to a comparison page
  doc2md --preview -o results.html --download-dir out/ report.docx

  # Machine-readable result list
  doc2md --json *.pdf > results.json

ENVIRONMENT VARIABLES:
  DOC2MD_SERVER        Base URL of the conversion server
  DOC2MD_TIMEOUT       Request timeout in seconds
  DOC2MD_OUTPUT        Results page path
  DOC2MD_DOWNLOAD_DIR  Directory for converted Markdown files
  RUST_LOG             Overrides the log filter (e.g. doc2md_client=debug)
"#;

/// Upload documents to a conversion server and collect the Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Upload documents to a document-to-Markdown server and collect the results",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to upload in one batch.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Base URL of the conversion server.
    #[arg(long, env = "DOC2MD_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Request timeout in seconds.
    #[arg(long, env = "DOC2MD_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Load the comparison preview of every converted file.
    #[arg(long, env = "DOC2MD_PREVIEW")]
    preview: bool,

    /// Write the results area as a standalone HTML page.
    #[arg(short, long, env = "DOC2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Download every converted Markdown file into this directory.
    #[arg(long, env = "DOC2MD_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Print the result list as JSON on stdout.
    #[arg(long, env = "DOC2MD_JSON")]
    json: bool,

    /// Disable the status spinner.
    #[arg(long, env = "DOC2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build session ────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let mut session = Session::new(config).context("Failed to create HTTP client")?;
    if show_progress {
        let cb: StatusCallback = CliStatusCallback::new();
        session = session.with_status_callback(cb);
    }

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        files.push(
            UploadFile::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }

    // ── Submit ───────────────────────────────────────────────────────────
    session.submit(files).await;

    if cli.preview {
        let opened = session.open_all_previews().await;
        if !cli.quiet {
            eprintln!("{} {} preview(s) loaded", cyan("◆"), opened);
        }
    }

    if let Some(ref dir) = cli.download_dir {
        download_all(&session, dir, cli.quiet).await?;
    }

    if let Some(ref output_path) = cli.output {
        session
            .save_page(output_path, "Conversion results")
            .await
            .context("Failed to write results page")?;
        if !cli.quiet {
            eprintln!("{} page  →  {}", green("✔"), bold(&output_path.display().to_string()));
        }
    }

    // ── Report ───────────────────────────────────────────────────────────
    match session.view() {
        ResultsView::List(items) => {
            if cli.json {
                let json =
                    serde_json::to_string_pretty(items).context("Failed to serialise results")?;
                println!("{json}");
            } else {
                for item in items {
                    match &item.outcome {
                        Outcome::Converted { processed_filename } => println!(
                            "{} {}  →  {}",
                            green("✓"),
                            item.original_filename,
                            processed_filename
                        ),
                        Outcome::ConvertedWithoutArtifact => println!(
                            "{} {}  {}",
                            cyan("⚠"),
                            item.original_filename,
                            dim("converted, no download provided")
                        ),
                        Outcome::Failed { .. } => println!(
                            "{} {}  {}",
                            red("✗"),
                            item.original_filename,
                            red(item.failure_message().unwrap_or_default())
                        ),
                    }
                }
            }
        }
        ResultsView::Notice(notice) => match notice.kind {
            NoticeKind::Info => {
                if !cli.quiet {
                    eprintln!("{} {}", cyan("◆"), notice.text);
                }
            }
            NoticeKind::Error => bail!("{}", notice.text),
        },
        ResultsView::Empty => {}
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`. Links in a saved page point at the
/// server itself so the page works outside the server's origin.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    ClientConfig::builder()
        .server_url(cli.server.clone())
        .link_base(cli.server.clone())
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")
}

/// Save every artifact of the current list into `dir`.
async fn download_all(session: &Session, dir: &Path, quiet: bool) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for (index, item) in session.results().iter().enumerate() {
        let Some(processed) = item.artifact() else {
            continue;
        };
        // Server-chosen names never escape the target directory.
        let Some(file_name) = Path::new(processed).file_name() else {
            warn!("Skipping artifact with unusable name '{}'", processed);
            continue;
        };
        let markdown = match session.download_artifact(index).await {
            Ok(m) => m,
            Err(e) => {
                eprintln!("{} {}  {}", red("✗"), processed, red(&e.to_string()));
                continue;
            }
        };
        let target = dir.join(file_name);
        tokio::fs::write(&target, markdown)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        if !quiet {
            eprintln!("  {} {}", green("↓"), dim(&target.display().to_string()));
        }
    }
    Ok(())
}
