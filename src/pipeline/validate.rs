//! Option validation: reject contradictory requests and resolve the plan.
//!
//! The branching between HTML and PDF output, merge or not, and inline or
//! deferred format conversion is decided here exactly once. Later stages only
//! read the resulting [`ConversionPlan`].

use crate::config::{FormatConversion, OutputFormat, PdfFormats};
use crate::error::ConvertError;
use crate::request::ConversionRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// How a validated request will be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConversionPlan {
    /// One HTML file per input. No merge, no normalisation.
    Html,
    /// One PDF per input, optionally merged and normalised.
    Pdf { merge: bool, formats: FormatPlan },
}

/// When, if at all, the archival formats are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", content = "formats", rename_all = "snake_case")]
pub enum FormatPlan {
    None,
    /// Passed to the converter with each document.
    Inline(PdfFormats),
    /// Applied by the PDF engine after conversion (and merge).
    Deferred(PdfFormats),
}

impl ConversionPlan {
    pub fn output_format(&self) -> OutputFormat {
        match self {
            ConversionPlan::Html => OutputFormat::Html,
            ConversionPlan::Pdf { .. } => OutputFormat::Pdf,
        }
    }

    /// `true` if the merge stage will run.
    pub fn merges(&self) -> bool {
        matches!(self, ConversionPlan::Pdf { merge: true, .. })
    }

    /// Formats the converter must apply inline, if any.
    pub fn inline_formats(&self) -> Option<&PdfFormats> {
        match self {
            ConversionPlan::Pdf {
                formats: FormatPlan::Inline(f),
                ..
            } => Some(f),
            _ => None,
        }
    }

    /// Formats the normalisation stage must apply, if any.
    pub fn deferred_formats(&self) -> Option<&PdfFormats> {
        match self {
            ConversionPlan::Pdf {
                formats: FormatPlan::Deferred(f),
                ..
            } => Some(f),
            _ => None,
        }
    }
}

/// Validate `request` against the converter's accepted `extensions` and
/// resolve its [`ConversionPlan`].
///
/// Checks run in a fixed order and the first violation is returned:
/// 1. at least one input
/// 2. every input extension is accepted
/// 3. HTML with merge and more than one input
/// 4. HTML with PDF/A or PDF/UA
/// 5. HTML with page ranges
pub fn validate(
    request: &ConversionRequest,
    extensions: &[&str],
) -> Result<ConversionPlan, ConvertError> {
    let inputs = request.inputs();
    let options = request.options();

    if inputs.is_empty() {
        return Err(ConvertError::NoInputDocuments);
    }
    for input in inputs {
        check_extension(input, extensions)?;
    }

    if options.is_html() {
        if options.merge && inputs.len() > 1 {
            return Err(ConvertError::HtmlWithMerge);
        }
        if !options.pdf_formats.is_empty() {
            return Err(ConvertError::HtmlWithPdfFormats);
        }
        if !options.page_ranges.is_empty() {
            return Err(ConvertError::HtmlWithPageRanges);
        }
        // A single HTML input with merge requested: merge has nothing to do.
        debug!("Plan: HTML output for {} document(s)", inputs.len());
        return Ok(ConversionPlan::Html);
    }

    let formats = if options.pdf_formats.is_empty() {
        FormatPlan::None
    } else {
        match options.format_conversion {
            FormatConversion::Native => FormatPlan::Inline(options.pdf_formats.clone()),
            FormatConversion::PostProcess => FormatPlan::Deferred(options.pdf_formats.clone()),
        }
    };
    let plan = ConversionPlan::Pdf {
        merge: options.merge && inputs.len() > 1,
        formats,
    };
    debug!("Plan: {:?} for {} document(s)", plan, inputs.len());
    Ok(plan)
}

fn check_extension(input: &Path, extensions: &[&str]) -> Result<(), ConvertError> {
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    if extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
        Ok(())
    } else {
        Err(ConvertError::UnsupportedExtension {
            path: input.to_path_buf(),
            extension,
        })
    }
}
