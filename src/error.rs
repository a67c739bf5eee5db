//! Error types for the office-convert library.
//!
//! Two layers of errors exist:
//!
//! * [`ConvertError`]: what a caller of [`crate::Pipeline::run`] sees. Every
//!   variant belongs to one [`ErrorKind`]: caller-correctable conditions
//!   (contradictory options, unsupported PDF format, malformed page ranges)
//!   or an opaque internal failure of a collaborator.
//!
//! * [`ConverterError`], [`EngineError`], [`RegistrarError`]: what the
//!   collaborators behind [`crate::ports`] report. The pipeline inspects only
//!   the variants it knows how to surface to the caller and wraps the rest.

use crate::config::PdfFormats;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The declared options or inputs are contradictory or invalid.
    InvalidRequest,
    /// The requested PDF/A or PDF/UA format is not handled.
    UnsupportedFormat,
    /// The page-range string was rejected by the converter.
    MalformedPageRanges,
    /// Any other collaborator failure.
    Internal,
}

/// All errors returned by the conversion pipeline.
///
/// The `Display` output of caller-correctable variants is the human-readable
/// reason meant for the caller. Internal variants carry their collaborator
/// error as `source`.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Request validation ────────────────────────────────────────────────
    /// The request named no input documents.
    #[error("No input documents were provided")]
    NoInputDocuments,

    /// An input has an extension the converter does not accept.
    #[error("File '{path}' has an unsupported extension '{extension}'")]
    UnsupportedExtension { path: PathBuf, extension: String },

    /// HTML output was requested together with merging several documents.
    #[error("Unable to merge multiple files using htmlFormat")]
    HtmlWithMerge,

    /// HTML output was requested together with PDF/A or PDF/UA.
    #[error("Both 'htmlFormat' and 'nativePdfFormats' form fields are provided")]
    HtmlWithPdfFormats,

    /// HTML output was requested together with page ranges.
    #[error("Both 'htmlFormat' and 'nativePageRanges' form fields are provided")]
    HtmlWithPageRanges,

    // ── Caller-correctable collaborator rejections ────────────────────────
    /// The converter does not support the requested inline PDF formats.
    #[error("A PDF format in '{formats}' is not supported")]
    UnsupportedPdfFormats { formats: PdfFormats },

    /// The converter rejected the page-range string.
    #[error("Malformed page ranges '{ranges}' (nativePageRanges)")]
    MalformedPageRanges { ranges: String },

    /// No PDF engine could normalise to the requested formats.
    #[error(
        "At least one PDF engine does not handle one of the PDF format in '{formats}', \
         while other have failed to convert for other reasons"
    )]
    PdfFormatNotSupported { formats: PdfFormats },

    // ── Internal failures ─────────────────────────────────────────────────
    /// Converting a single document failed.
    #[error("Convert '{input}' to {target}: {source}")]
    Conversion {
        input: PathBuf,
        target: &'static str,
        #[source]
        source: ConverterError,
    },

    /// Merging the converted PDFs failed.
    #[error("Merge {count} PDFs: {source}")]
    Merge {
        count: usize,
        #[source]
        source: EngineError,
    },

    /// Normalising a PDF to the requested formats failed.
    #[error("Convert PDF '{input}' to '{formats}': {source}")]
    Normalization {
        input: PathBuf,
        formats: PdfFormats,
        #[source]
        source: EngineError,
    },

    /// Handing the final artifacts to the result sink failed.
    #[error("Add output paths: {source}")]
    Registration {
        #[source]
        source: RegistrarError,
    },
}

impl ConvertError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::NoInputDocuments
            | ConvertError::UnsupportedExtension { .. }
            | ConvertError::HtmlWithMerge
            | ConvertError::HtmlWithPdfFormats
            | ConvertError::HtmlWithPageRanges => ErrorKind::InvalidRequest,
            ConvertError::UnsupportedPdfFormats { .. }
            | ConvertError::PdfFormatNotSupported { .. } => ErrorKind::UnsupportedFormat,
            ConvertError::MalformedPageRanges { .. } => ErrorKind::MalformedPageRanges,
            ConvertError::Conversion { .. }
            | ConvertError::Merge { .. }
            | ConvertError::Normalization { .. }
            | ConvertError::Registration { .. } => ErrorKind::Internal,
        }
    }

    /// `true` when the caller can fix the request and resubmit.
    pub fn is_bad_request(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    /// HTTP-style status code for an outer protocol layer: 400 or 500.
    pub fn status_code(&self) -> u16 {
        if self.is_bad_request() {
            400
        } else {
            500
        }
    }
}

/// Failure reported by a [`crate::ports::DocumentConverter`].
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The requested PDF/A or PDF/UA variant is not supported.
    #[error("invalid PDF formats")]
    InvalidPdfFormats,

    /// The page-range string could not be parsed.
    #[error("malformed page ranges")]
    MalformedPageRanges,

    /// The converter process could not be started or exited abnormally.
    #[error("{0}")]
    Process(String),

    /// The converter did not finish in time.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by a [`crate::ports::PdfEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine cannot produce the requested PDF formats.
    #[error("PDF format not supported")]
    PdfFormatNotSupported,

    /// The engine does not implement the requested operation at all.
    #[error("{operation} is not supported by this engine")]
    OperationNotSupported { operation: &'static str },

    /// The engine process could not be started or exited abnormally.
    #[error("{0}")]
    Process(String),

    /// The engine did not finish in time.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Several engines failed; one entry per engine.
    #[error("{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<EngineError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// `true` if this error, or any error it aggregates, is
    /// [`EngineError::PdfFormatNotSupported`].
    pub fn is_format_not_supported(&self) -> bool {
        match self {
            EngineError::PdfFormatNotSupported => true,
            EngineError::Multiple(errors) => errors.iter().any(EngineError::is_format_not_supported),
            _ => false,
        }
    }
}

/// Failure reported by a [`crate::ports::ResultRegistrar`].
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The sink would exceed its configured maximum number of outputs.
    #[error("cannot register {requested} outputs: limit is {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    /// The sink accepts one registration and already has one.
    #[error("outputs were already registered")]
    AlreadyRegistered,

    #[error("copy '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        for e in [
            ConvertError::NoInputDocuments,
            ConvertError::HtmlWithMerge,
            ConvertError::HtmlWithPdfFormats,
            ConvertError::HtmlWithPageRanges,
        ] {
            assert_eq!(e.kind(), ErrorKind::InvalidRequest);
            assert_eq!(e.status_code(), 400);
        }
    }

    #[test]
    fn malformed_ranges_names_the_string() {
        let e = ConvertError::MalformedPageRanges {
            ranges: "foo".into(),
        };
        assert!(e.to_string().contains("'foo'"), "got: {e}");
        assert!(e.is_bad_request());
    }

    #[test]
    fn unsupported_formats_names_the_format() {
        let e = ConvertError::PdfFormatNotSupported {
            formats: PdfFormats::new("PDF/A-4z", false),
        };
        assert!(e.to_string().contains("PDF/A-4z"), "got: {e}");
        assert_eq!(e.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn collaborator_failures_are_internal() {
        let e = ConvertError::Merge {
            count: 3,
            source: EngineError::Process("qpdf exited with status 2".into()),
        };
        assert_eq!(e.kind(), ErrorKind::Internal);
        assert_eq!(e.status_code(), 500);
        assert!(e.to_string().contains("qpdf exited"));
    }

    #[test]
    fn format_not_supported_is_found_inside_multiple() {
        let e = EngineError::Multiple(vec![
            EngineError::Process("boom".into()),
            EngineError::PdfFormatNotSupported,
        ]);
        assert!(e.is_format_not_supported());
        assert!(!EngineError::Multiple(vec![EngineError::Timeout { secs: 1 }])
            .is_format_not_supported());
    }
}
