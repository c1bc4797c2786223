//! CLI binary for cbzpub.
//!
//! A thin shim over the library crate: collects the archives to convert,
//! maps flags to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use cbzpub::{
    convert_batch, discover_archives, BatchReport, ConversionConfig, ConversionProgressCallback,
    ConversionStats, OutputMode, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per archive, reset by
/// `on_conversion_start`. Entries complete out of order, so the bar only
/// counts; dropped entries get their own log line.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Entries dropped in the current archive.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening archive…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.errors.store(0, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_entries: usize) {
        self.activate_bar(total_entries);
    }

    fn on_page_complete(&self, _index: usize, _total: usize, _bytes: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Entry {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_entries: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {}/{} entries rendered{}",
            if success_count == 0 {
                red("✘")
            } else if failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            bold(&success_count.to_string()),
            total_entries,
            if failed > 0 {
                dim(&format!("  ({failed} dropped)"))
            } else {
                String::new()
            },
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one archive into ./convert/volume01.epub
  cbzpub volume01.cbz

  # Kindle Paperwhite resolution, better quality
  cbzpub --width 1072 --height 1448 --quality 60 volume01.cbz

  # Every archive below a library folder, skipping finished ones
  cbzpub --recursive --skip-existing ~/comics -o ~/comics/epub

  # Write page images instead of an EPUB
  cbzpub --extract volume01.cbz

  # Machine-readable report
  cbzpub --json --no-progress *.cbz > report.json

ENVIRONMENT VARIABLES:
  Every flag can also be set through CBZPUB_<FLAG>, e.g. CBZPUB_WIDTH=1072.
  RUST_LOG overrides the log filter.
"#;

/// Convert CBZ comic archives into EPUB books sized for e-readers.
#[derive(Parser, Debug)]
#[command(
    name = "cbzpub",
    version,
    about = "Convert CBZ comic archives into EPUB books sized for e-readers",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// CBZ files or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving the converted output.
    #[arg(short, long, env = "CBZPUB_OUTPUT_DIR", default_value = "convert")]
    output_dir: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, env = "CBZPUB_WIDTH", default_value_t = 600,
          value_parser = clap::value_parser!(u32).range(128..))]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, env = "CBZPUB_HEIGHT", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(128..))]
    height: u32,

    /// JPEG quality (0–100).
    #[arg(long, env = "CBZPUB_QUALITY", default_value_t = 25,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Write a directory of page images instead of an EPUB.
    #[arg(long, env = "CBZPUB_EXTRACT")]
    extract: bool,

    /// Scan directories recursively.
    #[arg(short, long, env = "CBZPUB_RECURSIVE")]
    recursive: bool,

    /// Entries rendered in parallel. Default: number of CPUs.
    #[arg(short, long, env = "CBZPUB_JOBS")]
    jobs: Option<usize>,

    /// Skip archives whose output already exists.
    #[arg(long, env = "CBZPUB_SKIP_EXISTING")]
    skip_existing: bool,

    /// Print a JSON report of every archive on stdout.
    #[arg(long, env = "CBZPUB_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CBZPUB_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CBZPUB_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CBZPUB_QUIET")]
    quiet: bool,
}

/// One line of the `--json` report.
#[derive(Serialize)]
struct ReportEntry {
    input: PathBuf,
    output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ConversionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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

    // ── Collect archives ─────────────────────────────────────────────────
    let mode = if cli.extract {
        OutputMode::Extract
    } else {
        OutputMode::Epub
    };

    let mut inputs = discover_archives(&cli.inputs, &cli.output_dir, cli.recursive)
        .context("Failed to collect input archives")?;
    if cli.skip_existing {
        let before = inputs.len();
        inputs.retain(|input| !input.output_path(&cli.output_dir, mode).exists());
        if !cli.quiet && before != inputs.len() {
            eprintln!(
                "{} skipping {} already converted",
                dim("·"),
                before - inputs.len()
            );
        }
    }

    if inputs.is_empty() {
        if !cli.quiet {
            eprintln!("Nothing to convert.");
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        mode,
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {} archive(s) → {}",
                inputs.len(),
                cli.output_dir.display()
            ))
        );
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_batch(&inputs, &cli.output_dir, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }

    if cli.json {
        let entries: Vec<ReportEntry> = report
            .archives
            .iter()
            .map(|a| ReportEntry {
                input: a.input.clone(),
                output: a.output.clone(),
                stats: a.result.as_ref().ok().cloned(),
                error: a.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report);
    }

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} archive(s) failed",
            report.failed(),
            report.archives.len()
        );
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    mode: OutputMode,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .width(cli.width)
        .height(cli.height)
        .quality(cli.quality)
        .mode(mode);

    if let Some(jobs) = cli.jobs {
        builder = builder.concurrency(jobs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &BatchReport) {
    for archive in &report.archives {
        match &archive.result {
            Ok(stats) => eprintln!(
                "{}  {}/{} pages  {}ms  →  {}",
                if stats.failed_entries == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.rendered_pages,
                stats.total_entries,
                stats.total_duration_ms,
                bold(&archive.output.display().to_string()),
            ),
            Err(e) => eprintln!(
                "{}  {}  {}",
                red("✘"),
                archive.input.display(),
                red(&e.to_string())
            ),
        }
    }
}
