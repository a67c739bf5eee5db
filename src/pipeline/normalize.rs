//! Format normalisation stage: convert finished PDFs to PDF/A and/or PDF/UA.
//!
//! Only runs for deferred format conversion. It sees whatever the merge stage
//! left behind: either one merged PDF or one PDF per input.

use crate::config::PdfFormats;
use crate::error::ConvertError;
use crate::output::{ArtifactSet, IntermediateArtifact, Stage};
use crate::pipeline::validate::ConversionPlan;
use crate::ports::{PathAllocator, PdfEngine};
use crate::progress::ProgressCallback;
use tracing::{debug, info, warn};

/// Normalise each current artifact into a freshly allocated PDF.
///
/// Every output supersedes its input. The first failure aborts the stage.
pub async fn normalize_artifacts(
    engine: &dyn PdfEngine,
    paths: &dyn PathAllocator,
    set: ArtifactSet,
    plan: &ConversionPlan,
    progress: Option<&ProgressCallback>,
) -> Result<ArtifactSet, ConvertError> {
    let Some(formats) = plan.deferred_formats() else {
        return Ok(set);
    };

    if let Some(cb) = progress {
        cb.on_normalize(set.len());
    }
    info!("Converting {} PDF(s) to {}", set.len(), formats);

    let mut normalized = Vec::with_capacity(set.len());
    for artifact in set.artifacts() {
        let output = paths.new_path(".pdf");
        debug!("{} → {}", artifact.path.display(), output.display());
        engine
            .normalize(formats, &artifact.path, &output)
            .await
            .map_err(|e| map_engine_error(e, &artifact.path, formats))?;
        normalized.push(IntermediateArtifact::new(output, Stage::Normalized));
    }

    Ok(set.supersede(normalized))
}

fn map_engine_error(
    error: crate::error::EngineError,
    input: &std::path::Path,
    formats: &PdfFormats,
) -> ConvertError {
    warn!("Converting {} to {} failed: {}", input.display(), formats, error);
    if error.is_format_not_supported() {
        ConvertError::PdfFormatNotSupported {
            formats: formats.clone(),
        }
    } else {
        ConvertError::Normalization {
            input: input.to_path_buf(),
            formats: formats.clone(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::pipeline::validate::FormatPlan;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEngine {
        normalized: AtomicUsize,
    }

    #[async_trait]
    impl PdfEngine for CountingEngine {
        async fn merge(&self, _: &[PathBuf], _: &Path) -> Result<(), EngineError> {
            Ok(())
        }

        async fn normalize(&self, _: &PdfFormats, _: &Path, _: &Path) -> Result<(), EngineError> {
            self.normalized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FixedPaths;

    impl PathAllocator for FixedPaths {
        fn new_path(&self, extension: &str) -> PathBuf {
            PathBuf::from(format!("/work/n{extension}"))
        }
    }

    fn two_pdfs() -> ArtifactSet {
        ArtifactSet::new(vec![
            IntermediateArtifact::new("/work/a.pdf".into(), Stage::Converted),
            IntermediateArtifact::new("/work/b.pdf".into(), Stage::Converted),
        ])
    }

    #[tokio::test]
    async fn inline_formats_skip_the_stage() {
        let engine = CountingEngine {
            normalized: AtomicUsize::new(0),
        };
        let plan = ConversionPlan::Pdf {
            merge: false,
            formats: FormatPlan::Inline(PdfFormats::new("PDF/A-1b", false)),
        };
        let set = normalize_artifacts(&engine, &FixedPaths, two_pdfs(), &plan, None)
            .await
            .unwrap();
        assert_eq!(engine.normalized.load(Ordering::SeqCst), 0);
        assert!(set.superseded().is_empty());
    }

    #[tokio::test]
    async fn deferred_formats_supersede_every_artifact() {
        let engine = CountingEngine {
            normalized: AtomicUsize::new(0),
        };
        let plan = ConversionPlan::Pdf {
            merge: false,
            formats: FormatPlan::Deferred(PdfFormats::new("", true)),
        };
        let set = normalize_artifacts(&engine, &FixedPaths, two_pdfs(), &plan, None)
            .await
            .unwrap();
        assert_eq!(engine.normalized.load(Ordering::SeqCst), 2);
        assert!(set.artifacts().iter().all(|a| a.stage == Stage::Normalized));
        assert_eq!(
            set.superseded(),
            [PathBuf::from("/work/a.pdf"), PathBuf::from("/work/b.pdf")]
        );
    }
}
