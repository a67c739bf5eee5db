//! Collaborator interfaces consumed by the pipeline.
//!
//! The pipeline never converts or manipulates documents itself. It sequences
//! calls through these four traits; [`crate::backends`] provides
//! process-backed implementations, and tests substitute recording mocks.
//!
//! All traits are `Send + Sync` so a single [`crate::Pipeline`] can serve
//! concurrent requests. Thread safety of a shared collaborator is that
//! collaborator's concern.

use crate::config::PdfFormats;
use crate::error::{ConverterError, EngineError, RegistrarError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Options handed to the [`DocumentConverter`] for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterOptions {
    pub landscape: bool,
    /// Page ranges, empty for all pages.
    pub page_ranges: String,
    /// Formats to produce inline. Empty unless the caller asked for native
    /// format conversion.
    pub pdf_formats: PdfFormats,
    pub import_filter: String,
    pub import_options: String,
}

/// Turns one source document into a PDF or an HTML file.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// File extensions accepted as input, lowercase with a leading dot.
    fn extensions(&self) -> &[&'static str];

    /// Convert `input` to a PDF written at `output`.
    ///
    /// # Errors
    ///
    /// [`ConverterError::InvalidPdfFormats`] when `options.pdf_formats` is
    /// not supported, [`ConverterError::MalformedPageRanges`] when
    /// `options.page_ranges` cannot be parsed.
    async fn pdf(
        &self,
        input: &Path,
        output: &Path,
        options: &ConverterOptions,
    ) -> Result<(), ConverterError>;

    /// Convert `input` to an HTML file written at `output`.
    async fn html(
        &self,
        input: &Path,
        output: &Path,
        options: &ConverterOptions,
    ) -> Result<(), ConverterError>;
}

/// Post-processes finished PDFs.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Merge `inputs`, in order, into a single PDF at `output`.
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError>;

    /// Convert the PDF at `input` to `formats`, writing the result at `output`.
    ///
    /// # Errors
    ///
    /// [`EngineError::PdfFormatNotSupported`] when no backend handles
    /// `formats`.
    async fn normalize(
        &self,
        formats: &PdfFormats,
        input: &Path,
        output: &Path,
    ) -> Result<(), EngineError>;
}

/// Hands out output paths for one request.
pub trait PathAllocator: Send + Sync {
    /// A new path ending in `extension` (e.g. `".pdf"`). Never returns the
    /// same path twice.
    fn new_path(&self, extension: &str) -> PathBuf;
}

/// Sink that makes the final artifacts visible to the caller.
#[async_trait]
pub trait ResultRegistrar: Send + Sync {
    async fn register(&self, paths: &[PathBuf]) -> Result<(), RegistrarError>;
}
