//! LibreOffice (`soffice --headless`) as document converter and PDF/A engine.
//!
//! Each invocation gets its own temporary output directory and user profile,
//! so several conversions can run side by side without fighting over
//! LibreOffice's profile lock.
//!
//! Filter options use LibreOffice's JSON syntax
//! (`pdf:writer_pdf_Export:{"PageRange":{"type":"string","value":"1-2"}}`),
//! available since LibreOffice 7.4.
//!
//! The command line has no page-orientation switch, so `landscape` is
//! ignored by this backend.

use crate::backends::process::{self, Failure};
use crate::config::{BackendConfig, PdfFormats};
use crate::error::{ConverterError, EngineError};
use crate::ports::{ConverterOptions, DocumentConverter, PdfEngine};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use url::Url;

/// Input extensions LibreOffice is asked to convert.
pub const EXTENSIONS: &[&str] = &[
    ".123", ".602", ".abw", ".bib", ".bmp", ".cdr", ".cgm", ".cmx", ".csv", ".cwk", ".dbf",
    ".dif", ".doc", ".docm", ".docx", ".dot", ".dotm", ".dotx", ".dxf", ".emf", ".eps",
    ".epub", ".fodg", ".fodp", ".fods", ".fodt", ".fopd", ".gif", ".htm", ".html", ".hwp",
    ".jpeg", ".jpg", ".key", ".ltx", ".lwp", ".mcw", ".met", ".mml", ".mw", ".numbers",
    ".odd", ".odg", ".odm", ".odp", ".ods", ".odt", ".otg", ".oth", ".otp", ".ots", ".ott",
    ".pages", ".pbm", ".pcd", ".pct", ".pcx", ".pdb", ".pgm", ".png", ".pot", ".potm",
    ".potx", ".ppm", ".pps", ".ppt", ".pptm", ".pptx", ".psd", ".psw", ".pub", ".pwp",
    ".pxl", ".ras", ".rtf", ".sda", ".sdc", ".sdd", ".sdp", ".sdw", ".sgl", ".slk",
    ".smf", ".stc", ".std", ".sti", ".stw", ".svg", ".svm", ".swf", ".sxc", ".sxd",
    ".sxg", ".sxi", ".sxm", ".sxw", ".tga", ".tif", ".tiff", ".txt", ".uof", ".uop",
    ".uos", ".uot", ".vdx", ".vor", ".vsd", ".vsdm", ".vsdx", ".wb2", ".wk1", ".wks",
    ".wmf", ".wpd", ".wpg", ".wps", ".xbm", ".xhtml", ".xls", ".xlsb", ".xlsm", ".xlsx",
    ".xlt", ".xltm", ".xltx", ".xlw", ".xml", ".xpm", ".zabw",
];

const CALC: &[&str] = &[
    "123", "csv", "dbf", "dif", "fods", "numbers", "ods", "ots", "pxl", "sdc", "slk", "stc",
    "sxc", "uos", "wb2", "wk1", "wks", "xls", "xlsb", "xlsm", "xlsx", "xlt", "xltm", "xltx",
    "xlw",
];
const IMPRESS: &[&str] = &[
    "fodp", "key", "odp", "otp", "pot", "potm", "potx", "pps", "ppt", "pptm", "pptx", "pwp",
    "sda", "sdd", "sdp", "sti", "sxi", "uop",
];
const DRAW: &[&str] = &[
    "bmp", "cdr", "cgm", "cmx", "dxf", "emf", "eps", "fodg", "gif", "jpeg", "jpg", "met",
    "odg", "otg", "pbm", "pcd", "pct", "pcx", "pdf", "pgm", "png", "ppm", "psd", "pub",
    "ras", "std", "svg", "svm", "swf", "sxd", "tga", "tif", "tiff", "vdx", "vsd", "vsdm",
    "vsdx", "wmf", "wpg", "xbm", "xpm",
];

/// `1`, `2-5`, `1-3,7,9-10`, with optional spaces.
static RE_PAGE_RANGES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s*(-\s*\d+\s*)?(,\s*\d+\s*(-\s*\d+\s*)?)*$")
        .unwrap_or_else(|e| panic!("invalid page range pattern: {e}"))
});

/// LibreOffice driven through its command line.
#[derive(Debug, Clone)]
pub struct Soffice {
    bin: PathBuf,
    timeout_secs: u64,
}

impl Soffice {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            bin: config.soffice_bin.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Run one `--convert-to` invocation and move the produced file to
    /// `output`.
    async fn export(
        &self,
        input: &Path,
        output: &Path,
        convert_to: String,
        produced_extension: &str,
        infilter: Option<String>,
    ) -> Result<(), SofficeFailure> {
        let out_dir = TempDir::new().map_err(SofficeFailure::Io)?;
        let profile = TempDir::new().map_err(SofficeFailure::Io)?;

        let mut args: Vec<OsString> = vec![
            "--headless".into(),
            "--invisible".into(),
            "--norestore".into(),
            "--nolockcheck".into(),
            format!("-env:UserInstallation={}", profile_url(profile.path())?).into(),
        ];
        if let Some(filter) = infilter {
            args.push(format!("--infilter={filter}").into());
        }
        args.push("--convert-to".into());
        args.push(convert_to.into());
        args.push("--outdir".into());
        args.push(out_dir.path().into());
        args.push(input.into());

        let finished = process::run(&self.bin, &args, self.timeout_secs)
            .await
            .map_err(|f| match f {
                Failure::Spawn(e) => SofficeFailure::Io(e),
                Failure::Timeout => SofficeFailure::Timeout(self.timeout_secs),
            })?;
        if !finished.status.success() {
            return Err(SofficeFailure::Process(finished.describe(&self.bin)));
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let produced = out_dir.path().join(format!("{stem}.{produced_extension}"));
        if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
            // soffice exits 0 even when a filter refuses the document.
            return Err(SofficeFailure::Process(format!(
                "{} produced no output for '{}': {}",
                self.bin.display(),
                input.display(),
                finished.stderr.trim()
            )));
        }

        tokio::fs::copy(&produced, output)
            .await
            .map_err(SofficeFailure::Io)?;
        debug!("soffice: {} → {}", input.display(), output.display());
        Ok(())
    }
}

#[async_trait]
impl DocumentConverter for Soffice {
    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    async fn pdf(
        &self,
        input: &Path,
        output: &Path,
        options: &ConverterOptions,
    ) -> Result<(), ConverterError> {
        if options.landscape {
            warn!("soffice: landscape is not supported on the command line, ignoring");
        }
        let filter_options = pdf_filter_options(&options.page_ranges, &options.pdf_formats)?;
        let convert_to = convert_to_pdf(export_filter(input), &filter_options);
        self.export(input, output, convert_to, "pdf", infilter(options))
            .await
            .map_err(Into::into)
    }

    async fn html(
        &self,
        input: &Path,
        output: &Path,
        options: &ConverterOptions,
    ) -> Result<(), ConverterError> {
        self.export(input, output, "html".to_string(), "html", infilter(options))
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl PdfEngine for Soffice {
    async fn merge(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), EngineError> {
        Err(EngineError::OperationNotSupported { operation: "merge" })
    }

    async fn normalize(
        &self,
        formats: &PdfFormats,
        input: &Path,
        output: &Path,
    ) -> Result<(), EngineError> {
        let filter_options = pdf_filter_options("", formats).map_err(|e| match e {
            ConverterError::InvalidPdfFormats => EngineError::PdfFormatNotSupported,
            other => EngineError::Process(other.to_string()),
        })?;
        let convert_to = convert_to_pdf("draw_pdf_Export", &filter_options);
        self.export(
            input,
            output,
            convert_to,
            "pdf",
            Some("draw_pdf_import".to_string()),
        )
        .await
        .map_err(Into::into)
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

#[derive(Debug)]
enum SofficeFailure {
    Io(std::io::Error),
    Timeout(u64),
    Process(String),
}

impl From<SofficeFailure> for ConverterError {
    fn from(f: SofficeFailure) -> Self {
        match f {
            SofficeFailure::Io(e) => ConverterError::Io(e),
            SofficeFailure::Timeout(secs) => ConverterError::Timeout { secs },
            SofficeFailure::Process(msg) => ConverterError::Process(msg),
        }
    }
}

impl From<SofficeFailure> for EngineError {
    fn from(f: SofficeFailure) -> Self {
        match f {
            SofficeFailure::Io(e) => EngineError::Io(e),
            SofficeFailure::Timeout(secs) => EngineError::Timeout { secs },
            SofficeFailure::Process(msg) => EngineError::Process(msg),
        }
    }
}

/// `file://` URL of the per-call profile directory, percent-encoded.
fn profile_url(path: &Path) -> Result<Url, SofficeFailure> {
    Url::from_file_path(path).map_err(|()| {
        SofficeFailure::Process(format!(
            "profile directory '{}' is not an absolute path",
            path.display()
        ))
    })
}

/// PDF export filter of the LibreOffice module that opens `input`.
fn export_filter(input: &Path) -> &'static str {
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let ext = ext.as_str();
    if CALC.contains(&ext) {
        "calc_pdf_Export"
    } else if IMPRESS.contains(&ext) {
        "impress_pdf_Export"
    } else if DRAW.contains(&ext) {
        "draw_pdf_Export"
    } else {
        "writer_pdf_Export"
    }
}

fn convert_to_pdf(filter: &str, filter_options: &Map<String, Value>) -> String {
    if filter_options.is_empty() {
        format!("pdf:{filter}")
    } else {
        format!("pdf:{filter}:{}", Value::Object(filter_options.clone()))
    }
}

fn infilter(options: &ConverterOptions) -> Option<String> {
    match (
        options.import_filter.is_empty(),
        options.import_options.is_empty(),
    ) {
        (true, _) => None,
        (false, true) => Some(options.import_filter.clone()),
        (false, false) => Some(format!(
            "{}:{}",
            options.import_filter, options.import_options
        )),
    }
}

/// Build the JSON filter options for a PDF export.
fn pdf_filter_options(
    page_ranges: &str,
    formats: &PdfFormats,
) -> Result<Map<String, Value>, ConverterError> {
    let mut map = Map::new();

    if !page_ranges.is_empty() {
        if !RE_PAGE_RANGES.is_match(page_ranges) {
            return Err(ConverterError::MalformedPageRanges);
        }
        let normalized: String = page_ranges.chars().filter(|c| !c.is_whitespace()).collect();
        map.insert(
            "PageRange".into(),
            json!({ "type": "string", "value": normalized }),
        );
    }

    if let Some(version) = pdfa_version(&formats.pdfa)? {
        map.insert(
            "SelectPdfVersion".into(),
            json!({ "type": "long", "value": version.to_string() }),
        );
    }

    if formats.pdfua {
        map.insert(
            "PDFUACompliance".into(),
            json!({ "type": "boolean", "value": "true" }),
        );
    }

    Ok(map)
}

/// LibreOffice `SelectPdfVersion` for a PDF/A variant.
fn pdfa_version(pdfa: &str) -> Result<Option<u8>, ConverterError> {
    match pdfa {
        "" => Ok(None),
        "PDF/A-1b" => Ok(Some(1)),
        "PDF/A-2b" => Ok(Some(2)),
        "PDF/A-3b" => Ok(Some(3)),
        _ => Err(ConverterError::InvalidPdfFormats),
    }
}
