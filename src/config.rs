//! Configuration types for a conversion request.
//!
//! Request behaviour is controlled through [`ConversionOptions`], built via
//! its [`ConversionOptionsBuilder`]. Every field mirrors one form field of the
//! conversion route (`landscape`, `nativePageRanges`, `pdfa`, `pdfua`,
//! `nativePdfFormats`, `htmlFormat`, `merge`, `importFilter`,
//! `importOptions`) and defaults to the same value the route uses.
//!
//! [`BackendConfig`] configures the process-backed collaborators in
//! [`crate::backends`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Options declared by the caller for one conversion request.
///
/// # Example
/// ```rust
/// use office_convert::{ConversionOptions, FormatConversion, PdfFormats};
///
/// let options = ConversionOptions::builder()
///     .merge(true)
///     .pdf_formats(PdfFormats::new("PDF/A-2b", false))
///     .format_conversion(FormatConversion::PostProcess)
///     .build();
/// assert!(options.merge);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Landscape page orientation. Default: false.
    pub landscape: bool,

    /// Page ranges in the converter's syntax, e.g. `"1-3,5"`. Empty selects
    /// all pages. Default: empty.
    pub page_ranges: String,

    /// Target PDF/A variant and PDF/UA toggle. Default: none.
    pub pdf_formats: PdfFormats,

    /// Whether `pdf_formats` is applied by the converter itself or by the PDF
    /// engine afterwards. Default: [`FormatConversion::Native`].
    pub format_conversion: FormatConversion,

    /// PDF or HTML output. Default: [`OutputFormat::Pdf`].
    pub output: OutputFormat,

    /// Merge the converted PDFs into one. Default: false.
    pub merge: bool,

    /// Import filter name forwarded verbatim to the converter.
    pub import_filter: String,

    /// Import filter options forwarded verbatim to the converter.
    pub import_options: String,
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// `true` when HTML output is requested.
    pub fn is_html(&self) -> bool {
        self.output == OutputFormat::Html
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn landscape(mut self, v: bool) -> Self {
        self.options.landscape = v;
        self
    }

    pub fn page_ranges(mut self, ranges: impl Into<String>) -> Self {
        self.options.page_ranges = ranges.into();
        self
    }

    pub fn pdf_formats(mut self, formats: PdfFormats) -> Self {
        self.options.pdf_formats = formats;
        self
    }

    pub fn pdfa(mut self, variant: impl Into<String>) -> Self {
        self.options.pdf_formats.pdfa = variant.into();
        self
    }

    pub fn pdfua(mut self, v: bool) -> Self {
        self.options.pdf_formats.pdfua = v;
        self
    }

    pub fn format_conversion(mut self, mode: FormatConversion) -> Self {
        self.options.format_conversion = mode;
        self
    }

    pub fn output(mut self, output: OutputFormat) -> Self {
        self.options.output = output;
        self
    }

    pub fn html(self, v: bool) -> Self {
        self.output(if v { OutputFormat::Html } else { OutputFormat::Pdf })
    }

    pub fn merge(mut self, v: bool) -> Self {
        self.options.merge = v;
        self
    }

    pub fn import_filter(mut self, filter: impl Into<String>) -> Self {
        self.options.import_filter = filter.into();
        self
    }

    pub fn import_options(mut self, options: impl Into<String>) -> Self {
        self.options.import_options = options.into();
        self
    }

    /// Finish the builder.
    ///
    /// Option combinations are checked per request by
    /// [`crate::pipeline::validate`], since some rules depend on the number
    /// of inputs.
    pub fn build(self) -> ConversionOptions {
        self.options
    }
}

// ── Enums & value types ──────────────────────────────────────────────────

/// PDF/A variant plus PDF/UA toggle.
///
/// The zero value (`pdfa` empty, `pdfua` false) means no archival format was
/// requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfFormats {
    /// PDF/A variant, e.g. `"PDF/A-2b"`. Empty for none.
    pub pdfa: String,
    /// PDF/UA (accessibility) compliance.
    pub pdfua: bool,
}

impl PdfFormats {
    pub fn new(pdfa: impl Into<String>, pdfua: bool) -> Self {
        Self {
            pdfa: pdfa.into(),
            pdfua,
        }
    }

    /// `true` for the "no normalisation requested" sentinel.
    pub fn is_empty(&self) -> bool {
        self.pdfa.is_empty() && !self.pdfua
    }
}

impl fmt::Display for PdfFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{PdfA:{} PdfUa:{}}}", self.pdfa, self.pdfua)
    }
}

/// Where archival-format conversion happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatConversion {
    /// The document converter produces the requested formats directly.
    #[default]
    Native,
    /// The PDF engine converts the finished PDF(s) in a separate step.
    PostProcess,
}

impl FormatConversion {
    /// Map the route's `nativePdfFormats` boolean.
    pub fn from_native_flag(native: bool) -> Self {
        if native {
            FormatConversion::Native
        } else {
            FormatConversion::PostProcess
        }
    }
}

/// Output file type of the per-document conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
}

impl OutputFormat {
    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => ".pdf",
            OutputFormat::Html => ".html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "PDF"),
            OutputFormat::Html => write!(f, "HTML"),
        }
    }
}

// ── Backend configuration ────────────────────────────────────────────────

/// Configuration for the process-backed collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// LibreOffice executable. Default: `soffice`.
    pub soffice_bin: PathBuf,

    /// qpdf executable. Default: `qpdf`.
    pub qpdf_bin: PathBuf,

    /// Per-process timeout in seconds. Default: 300.
    ///
    /// Applies to each spawned command, not to the whole request.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            soffice_bin: PathBuf::from("soffice"),
            qpdf_bin: PathBuf::from("qpdf"),
            timeout_secs: 300,
        }
    }
}

impl BackendConfig {
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BackendConfig`].
#[derive(Debug)]
pub struct BackendConfigBuilder {
    config: BackendConfig,
}

impl BackendConfigBuilder {
    pub fn soffice_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_bin = path.into();
        self
    }

    pub fn qpdf_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.qpdf_bin = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn build(self) -> BackendConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_route_defaults() {
        let o = ConversionOptions::default();
        assert!(!o.landscape);
        assert!(o.page_ranges.is_empty());
        assert!(o.pdf_formats.is_empty());
        assert_eq!(o.format_conversion, FormatConversion::Native);
        assert_eq!(o.output, OutputFormat::Pdf);
        assert!(!o.merge);
    }

    #[test]
    fn pdfua_alone_is_not_empty() {
        assert!(!PdfFormats::new("", true).is_empty());
        assert!(!PdfFormats::new("PDF/A-1b", false).is_empty());
        assert!(PdfFormats::default().is_empty());
    }

    #[test]
    fn builder_sets_formats_piecewise() {
        let o = ConversionOptions::builder()
            .pdfa("PDF/A-3b")
            .pdfua(true)
            .html(false)
            .build();
        assert_eq!(o.pdf_formats, PdfFormats::new("PDF/A-3b", true));
        assert!(!o.is_html());
    }

    #[test]
    fn native_flag_maps_to_enum() {
        assert_eq!(FormatConversion::from_native_flag(true), FormatConversion::Native);
        assert_eq!(
            FormatConversion::from_native_flag(false),
            FormatConversion::PostProcess
        );
    }

    #[test]
    fn backend_timeout_is_at_least_one_second() {
        let c = BackendConfig::builder().timeout_secs(0).build();
        assert_eq!(c.timeout_secs, 1);
    }

    #[test]
    fn formats_display() {
        let f = PdfFormats::new("PDF/A-2b", false);
        assert_eq!(f.to_string(), "{PdfA:PDF/A-2b PdfUa:false}");
    }
}
