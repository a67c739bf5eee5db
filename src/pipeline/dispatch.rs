//! Per-document conversion: hand each input to the document converter.
//!
//! Documents are converted strictly one after another, in request order.
//! The first failure aborts the request; later documents are not attempted.

use crate::config::{ConversionOptions, OutputFormat};
use crate::error::{ConvertError, ConverterError};
use crate::output::{ArtifactSet, IntermediateArtifact, Stage};
use crate::pipeline::validate::ConversionPlan;
use crate::ports::{ConverterOptions, DocumentConverter, PathAllocator};
use crate::progress::ProgressCallback;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Convert every input and return one [`Stage::Converted`] artifact per
/// input, in input order.
pub async fn convert_documents(
    converter: &dyn DocumentConverter,
    paths: &dyn PathAllocator,
    inputs: &[PathBuf],
    options: &ConversionOptions,
    plan: &ConversionPlan,
    progress: Option<&ProgressCallback>,
) -> Result<ArtifactSet, ConvertError> {
    let output_format = plan.output_format();
    let converter_options = converter_options(options, plan);
    let total = inputs.len();
    let mut artifacts = Vec::with_capacity(total);

    for (index, input) in inputs.iter().enumerate() {
        let output = paths.new_path(output_format.extension());
        if let Some(cb) = progress {
            cb.on_document_start(index, total, input);
        }
        debug!(
            "Converting {} ({}/{}) to {} → {}",
            input.display(),
            index + 1,
            total,
            output_format,
            output.display()
        );

        let result = match output_format {
            OutputFormat::Html => converter.html(input, &output, &converter_options).await,
            OutputFormat::Pdf => converter.pdf(input, &output, &converter_options).await,
        };
        if let Err(e) = result {
            warn!("Converting {} failed: {}", input.display(), e);
            return Err(map_converter_error(e, input, output_format, options));
        }

        if let Some(cb) = progress {
            cb.on_document_complete(index, total, &output);
        }
        artifacts.push(IntermediateArtifact::new(output, Stage::Converted));
    }

    Ok(ArtifactSet::new(artifacts))
}

/// Options forwarded to the converter. Formats are only included when the
/// plan applies them inline.
fn converter_options(options: &ConversionOptions, plan: &ConversionPlan) -> ConverterOptions {
    ConverterOptions {
        landscape: options.landscape,
        page_ranges: options.page_ranges.clone(),
        pdf_formats: plan.inline_formats().cloned().unwrap_or_default(),
        import_filter: options.import_filter.clone(),
        import_options: options.import_options.clone(),
    }
}

fn map_converter_error(
    error: ConverterError,
    input: &std::path::Path,
    output_format: OutputFormat,
    options: &ConversionOptions,
) -> ConvertError {
    // HTML conversion has no format or range semantics to report.
    if output_format == OutputFormat::Pdf {
        match error {
            ConverterError::InvalidPdfFormats => {
                return ConvertError::UnsupportedPdfFormats {
                    formats: options.pdf_formats.clone(),
                }
            }
            ConverterError::MalformedPageRanges => {
                return ConvertError::MalformedPageRanges {
                    ranges: options.page_ranges.clone(),
                }
            }
            _ => {}
        }
    }
    ConvertError::Conversion {
        input: input.to_path_buf(),
        target: match output_format {
            OutputFormat::Pdf => "PDF",
            OutputFormat::Html => "HTML",
        },
        source: error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatConversion, PdfFormats};
    use crate::pipeline::validate::FormatPlan;

    #[test]
    fn inline_formats_are_forwarded() {
        let options = ConversionOptions::builder()
            .pdfa("PDF/A-2b")
            .import_filter("Text (encoded)")
            .import_options("UTF8")
            .landscape(true)
            .build();
        let plan = ConversionPlan::Pdf {
            merge: false,
            formats: FormatPlan::Inline(options.pdf_formats.clone()),
        };
        let c = converter_options(&options, &plan);
        assert_eq!(c.pdf_formats, PdfFormats::new("PDF/A-2b", false));
        assert_eq!(c.import_filter, "Text (encoded)");
        assert_eq!(c.import_options, "UTF8");
        assert!(c.landscape);
    }

    #[test]
    fn deferred_formats_are_withheld() {
        let options = ConversionOptions::builder()
            .pdfa("PDF/A-2b")
            .format_conversion(FormatConversion::PostProcess)
            .build();
        let plan = ConversionPlan::Pdf {
            merge: false,
            formats: FormatPlan::Deferred(options.pdf_formats.clone()),
        };
        assert!(converter_options(&options, &plan).pdf_formats.is_empty());
    }

    #[test]
    fn html_errors_are_always_internal() {
        let options = ConversionOptions::builder().html(true).build();
        let e = map_converter_error(
            ConverterError::MalformedPageRanges,
            std::path::Path::new("a.docx"),
            OutputFormat::Html,
            &options,
        );
        assert!(matches!(e, ConvertError::Conversion { target: "HTML", .. }));
    }

    #[test]
    fn pdf_range_error_names_the_ranges() {
        let options = ConversionOptions::builder().page_ranges("9-x").build();
        let e = map_converter_error(
            ConverterError::MalformedPageRanges,
            std::path::Path::new("a.docx"),
            OutputFormat::Pdf,
            &options,
        );
        match e {
            ConvertError::MalformedPageRanges { ranges } => assert_eq!(ranges, "9-x"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
