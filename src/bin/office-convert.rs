//! CLI binary for office-convert.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionOptions`, runs the pipeline against LibreOffice and qpdf, and
//! copies the results into the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use office_convert::backends::{default_collaborators, OutputDirRegistrar, WorkDir};
use office_convert::{
    BackendConfig, ConversionOptions, ConversionProgressCallback, ConversionRequest, ConvertError,
    FormatConversion, OutputFormat, PdfFormats, Pipeline, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the input documents, plus a log
/// line per finished document and per post-processing stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.reset_eta();
    }

    fn on_document_start(&self, _index: usize, _total: usize, input: &Path) {
        self.bar.set_message(file_name(input));
    }

    fn on_document_complete(&self, index: usize, total: usize, _output: &Path) {
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}",
            green("✓"),
            index + 1,
            total
        ));
        self.bar.inc(1);
    }

    fn on_merge(&self, count: usize) {
        self.bar.set_prefix("Merging");
        self.bar.set_message(format!("{count} PDFs"));
    }

    fn on_normalize(&self, count: usize) {
        self.bar.set_prefix("Normalising");
        self.bar.set_message(format!("{count} PDF(s)"));
    }

    fn on_conversion_complete(&self, _outputs: &[PathBuf]) {
        self.bar.finish_and_clear();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a document to PDF in the current directory
  office-convert report.docx

  # Merge several documents into one PDF/A-2b file
  office-convert --merge --pdfa PDF/A-2b a.docx b.xlsx c.pptx -o out/

  # Convert to PDF first, then normalise each PDF with the PDF engines
  office-convert --no-native-pdf-formats --pdfa PDF/A-1b a.docx b.docx

  # Selected pages only
  office-convert --native-page-ranges 1-3,7 thesis.odt

  # HTML output
  office-convert --html-format notes.docx

  # Print the result as JSON
  office-convert --json a.docx

EXIT CODES:
  0  success
  1  internal failure (converter, PDF engine or output directory)
  2  invalid request (conflicting options, unsupported format, bad page ranges)

ENVIRONMENT VARIABLES:
  SOFFICE_BIN   LibreOffice executable (default: soffice)
  QPDF_BIN      qpdf executable (default: qpdf)
  RUST_LOG      Overrides the log filter
"#;

/// Convert office documents to PDF or HTML using LibreOffice and qpdf.
#[derive(Parser, Debug)]
#[command(
    name = "office-convert",
    version,
    about = "Convert office documents to PDF or HTML, with merge and PDF/A / PDF/UA normalisation",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input documents, converted in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the results are written to.
    #[arg(short, long, env = "OFFICE_CONVERT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// File name (without extension) of the results.
    #[arg(long, env = "OFFICE_CONVERT_BASENAME", default_value = "result")]
    basename: String,

    /// Landscape orientation. No effect with the LibreOffice command-line
    /// backend, which has no orientation switch.
    #[arg(long)]
    landscape: bool,

    /// Page ranges to print, e.g. 1-4,7.
    #[arg(long, default_value = "")]
    native_page_ranges: String,

    /// PDF/A variant of the result: PDF/A-1b, PDF/A-2b or PDF/A-3b.
    #[arg(long, default_value = "")]
    pdfa: String,

    /// Produce PDF/UA (accessible) PDFs.
    #[arg(long)]
    pdfua: bool,

    /// Apply --pdfa/--pdfua with the PDF engines after conversion instead
    /// of during conversion.
    #[arg(long)]
    no_native_pdf_formats: bool,

    /// Convert to HTML instead of PDF.
    #[arg(long)]
    html_format: bool,

    /// Merge the resulting PDFs into one file.
    #[arg(long)]
    merge: bool,

    /// LibreOffice import filter, forwarded verbatim.
    #[arg(long, default_value = "")]
    import_filter: String,

    /// LibreOffice import filter options, forwarded verbatim.
    #[arg(long, default_value = "")]
    import_options: String,

    /// LibreOffice executable.
    #[arg(long, env = "SOFFICE_BIN", default_value = "soffice")]
    soffice_bin: PathBuf,

    /// qpdf executable.
    #[arg(long, env = "QPDF_BIN", default_value = "qpdf")]
    qpdf_bin: PathBuf,

    /// Timeout for each external process, in seconds.
    #[arg(long, env = "OFFICE_CONVERT_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OFFICE_CONVERT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OFFICE_CONVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OFFICE_CONVERT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
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

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("✘"), e);
            let bad_request = e
                .downcast_ref::<ConvertError>()
                .is_some_and(ConvertError::is_bad_request);
            ExitCode::from(if bad_request { 2 } else { 1 })
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let backend = BackendConfig::builder()
        .soffice_bin(&cli.soffice_bin)
        .qpdf_bin(&cli.qpdf_bin)
        .timeout_secs(cli.timeout)
        .build();
    let (converter, engine) = default_collaborators(&backend);

    let mut pipeline = Pipeline::new(converter, engine);
    if show_progress {
        pipeline = pipeline.with_progress(CliProgressCallback::new() as ProgressCallback);
    }

    let request = ConversionRequest::new(cli.inputs.iter().cloned(), build_options(cli));
    let work = WorkDir::new().context("Failed to create working directory")?;
    let registrar = OutputDirRegistrar::new(&cli.output_dir, cli.basename.clone());

    // ConvertError stays the root cause so `main` can pick the exit code.
    let result = pipeline.run(&request, &work, &registrar).await?;

    if cli.json {
        let report = serde_json::json!({
            "outputs": registrar.registered(),
            "stats": result.stats,
        });
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise result")?;
        println!("{json}");
    } else if !cli.quiet {
        for path in registrar.registered() {
            eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
        }
        eprintln!(
            "   {} document(s) → {} output(s)  {}",
            result.stats.documents,
            result.len(),
            dim(&format!("{}ms", result.stats.total_duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionOptions`.
fn build_options(cli: &Cli) -> ConversionOptions {
    ConversionOptions::builder()
        .landscape(cli.landscape)
        .page_ranges(cli.native_page_ranges.clone())
        .pdf_formats(PdfFormats::new(cli.pdfa.clone(), cli.pdfua))
        .format_conversion(FormatConversion::from_native_flag(!cli.no_native_pdf_formats))
        .output(if cli.html_format {
            OutputFormat::Html
        } else {
            OutputFormat::Pdf
        })
        .merge(cli.merge)
        .import_filter(cli.import_filter.clone())
        .import_options(cli.import_options.clone())
        .build()
}
