//! Output assembly: register the final artifacts with the result sink.

use crate::error::ConvertError;
use crate::output::{ArtifactSet, ConversionStats, FinalArtifactSet};
use crate::ports::ResultRegistrar;
use tracing::warn;

/// Register the current artifacts, preserving order, and build the
/// [`FinalArtifactSet`].
pub async fn assemble(
    registrar: &dyn ResultRegistrar,
    set: ArtifactSet,
    stats: ConversionStats,
) -> Result<FinalArtifactSet, ConvertError> {
    let paths = set.paths();
    registrar.register(&paths).await.map_err(|e| {
        warn!("Registering {} output(s) failed: {}", paths.len(), e);
        ConvertError::Registration { source: e }
    })?;

    let (outputs, superseded) = set.into_parts();
    Ok(FinalArtifactSet {
        outputs,
        superseded,
        stats,
    })
}
