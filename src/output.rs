//! Artifacts produced while a request moves through the pipeline.
//!
//! Each stage consumes the current [`ArtifactSet`] and returns a new one.
//! An artifact replaced by a later stage is moved to the set's `superseded`
//! list: it is never read downstream and never deleted here. Cleanup belongs
//! to whoever owns the request's working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline stage that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Converted,
    Merged,
    Normalized,
}

/// One file written by a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateArtifact {
    pub path: PathBuf,
    pub stage: Stage,
}

impl IntermediateArtifact {
    pub fn new(path: PathBuf, stage: Stage) -> Self {
        Self { path, stage }
    }
}

/// The ordered artifacts that are current after a stage, plus everything
/// earlier stages produced and later ones replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    current: Vec<IntermediateArtifact>,
    superseded: Vec<PathBuf>,
}

impl ArtifactSet {
    pub fn new(current: Vec<IntermediateArtifact>) -> Self {
        Self {
            current,
            superseded: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn artifacts(&self) -> &[IntermediateArtifact] {
        &self.current
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.current.iter().map(|a| a.path.clone()).collect()
    }

    /// Replace every current artifact with `next`; the old paths become
    /// superseded.
    pub fn supersede(mut self, next: Vec<IntermediateArtifact>) -> Self {
        self.superseded
            .extend(self.current.drain(..).map(|a| a.path));
        self.current = next;
        self
    }

    pub fn superseded(&self) -> &[PathBuf] {
        &self.superseded
    }

    pub(crate) fn into_parts(self) -> (Vec<IntermediateArtifact>, Vec<PathBuf>) {
        (self.current, self.superseded)
    }
}

/// What the pipeline reports to the caller once the outputs are registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalArtifactSet {
    /// Registered outputs: one merged file, or one per input in input order.
    pub outputs: Vec<IntermediateArtifact>,

    /// Intermediate files replaced by a later stage, in creation order.
    pub superseded: Vec<PathBuf>,

    pub stats: ConversionStats,
}

impl FinalArtifactSet {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.outputs.iter().map(|a| a.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Counters and timings for a finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of input documents.
    pub documents: usize,
    /// Whether the merge stage ran.
    pub merged: bool,
    /// Number of normalisation calls made.
    pub normalized: usize,
    pub conversion_duration_ms: u64,
    pub merge_duration_ms: u64,
    pub normalize_duration_ms: u64,
    pub total_duration_ms: u64,
}
