//! Request-level entry points.
//!
//! [`Pipeline`] holds the shared collaborators; [`Pipeline::run`] executes one
//! request against a per-request [`PathAllocator`] and [`ResultRegistrar`].
//! A pipeline holds no per-request state, so one instance can serve
//! concurrent requests.

use crate::error::ConvertError;
use crate::output::{ConversionStats, FinalArtifactSet};
use crate::pipeline::{assemble, dispatch, merge, normalize, validate};
use crate::ports::{DocumentConverter, PathAllocator, PdfEngine, ResultRegistrar};
use crate::progress::ProgressCallback;
use crate::request::ConversionRequest;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The conversion pipeline: validate → convert → merge → normalise → register.
#[derive(Clone)]
pub struct Pipeline {
    converter: Arc<dyn DocumentConverter>,
    engine: Arc<dyn PdfEngine>,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("converter", &"<dyn DocumentConverter>")
            .field("engine", &"<dyn PdfEngine>")
            .field(
                "progress",
                &self.progress.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl Pipeline {
    pub fn new(converter: Arc<dyn DocumentConverter>, engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            converter,
            engine,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execute one request.
    ///
    /// # Returns
    /// The registered [`FinalArtifactSet`]: one merged output, or one output
    /// per input in input order.
    ///
    /// # Errors
    /// The first failing stage aborts the request. Validation errors are
    /// returned before any collaborator is called; a failed conversion means
    /// no merge, normalisation or registration happens.
    pub async fn run(
        &self,
        request: &ConversionRequest,
        paths: &dyn PathAllocator,
        registrar: &dyn ResultRegistrar,
    ) -> Result<FinalArtifactSet, ConvertError> {
        let total_start = Instant::now();
        let progress = self.progress.as_ref();

        // ── Step 1: Validate ─────────────────────────────────────────────
        let plan = validate(request, self.converter.extensions())?;
        let inputs = request.inputs();
        info!(
            "Starting conversion of {} document(s) to {}",
            inputs.len(),
            plan.output_format()
        );
        if let Some(cb) = progress {
            cb.on_conversion_start(inputs.len());
        }

        // ── Step 2: Convert each document ────────────────────────────────
        let step_start = Instant::now();
        let set = dispatch::convert_documents(
            self.converter.as_ref(),
            paths,
            inputs,
            request.options(),
            &plan,
            progress,
        )
        .await?;
        let conversion_duration_ms = step_start.elapsed().as_millis() as u64;

        // ── Step 3: Merge ────────────────────────────────────────────────
        let step_start = Instant::now();
        let set = merge::merge_artifacts(self.engine.as_ref(), paths, set, &plan, progress).await?;
        let merge_duration_ms = step_start.elapsed().as_millis() as u64;

        // ── Step 4: Normalise ────────────────────────────────────────────
        let step_start = Instant::now();
        let before = set.len();
        let set =
            normalize::normalize_artifacts(self.engine.as_ref(), paths, set, &plan, progress)
                .await?;
        let normalize_duration_ms = step_start.elapsed().as_millis() as u64;
        let normalized = if plan.deferred_formats().is_some() {
            before
        } else {
            0
        };

        // ── Step 5: Register outputs ─────────────────────────────────────
        let stats = ConversionStats {
            documents: inputs.len(),
            merged: plan.merges(),
            normalized,
            conversion_duration_ms,
            merge_duration_ms,
            normalize_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        let result = assemble::assemble(registrar, set, stats).await?;

        info!(
            "Conversion complete: {} document(s) → {} output(s), {}ms total",
            inputs.len(),
            result.len(),
            result.stats.total_duration_ms
        );
        if let Some(cb) = progress {
            let outputs: Vec<_> = result.paths().map(|p| p.to_path_buf()).collect();
            cb.on_conversion_complete(&outputs);
        }

        Ok(result)
    }
}

/// Run a single request through a freshly built [`Pipeline`].
pub async fn convert(
    request: &ConversionRequest,
    converter: Arc<dyn DocumentConverter>,
    engine: Arc<dyn PdfEngine>,
    paths: &dyn PathAllocator,
    registrar: &dyn ResultRegistrar,
) -> Result<FinalArtifactSet, ConvertError> {
    Pipeline::new(converter, engine)
        .run(request, paths, registrar)
        .await
}
