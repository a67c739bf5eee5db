//! Merge stage: combine the per-document PDFs into one.

use crate::error::ConvertError;
use crate::output::{ArtifactSet, IntermediateArtifact, Stage};
use crate::pipeline::validate::ConversionPlan;
use crate::ports::{PathAllocator, PdfEngine};
use crate::progress::ProgressCallback;
use tracing::{info, warn};

/// Merge all current artifacts, in order, into a single PDF.
///
/// Runs only when the plan merges and more than one artifact exists;
/// otherwise `set` is returned unchanged. A failed merge aborts the request,
/// no partial result is kept.
pub async fn merge_artifacts(
    engine: &dyn PdfEngine,
    paths: &dyn PathAllocator,
    set: ArtifactSet,
    plan: &ConversionPlan,
    progress: Option<&ProgressCallback>,
) -> Result<ArtifactSet, ConvertError> {
    if !plan.merges() || set.len() < 2 {
        return Ok(set);
    }

    let inputs = set.paths();
    let output = paths.new_path(".pdf");
    if let Some(cb) = progress {
        cb.on_merge(inputs.len());
    }
    info!("Merging {} PDFs into {}", inputs.len(), output.display());

    engine.merge(&inputs, &output).await.map_err(|e| {
        warn!("Merge failed: {}", e);
        ConvertError::Merge {
            count: inputs.len(),
            source: e,
        }
    })?;

    Ok(set.supersede(vec![IntermediateArtifact::new(output, Stage::Merged)]))
}
