//! Progress-callback trait for per-stage conversion events.
//!
//! Attach an [`Arc<dyn ConversionProgressCallback>`] with
//! [`crate::Pipeline::with_progress`] to receive events as the pipeline
//! converts each document and runs the merge and normalisation stages.
//!
//! # Example
//!
//! ```rust
//! use office_convert::ConversionProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, _output: &Path) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done", index + 1, total);
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Called by the pipeline as a request progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed one at a time, but one
/// callback may be shared by concurrent requests, hence `Send + Sync`.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after validation succeeded.
    ///
    /// * `total_documents`: number of input documents
    fn on_conversion_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is handed to the converter.
    ///
    /// * `index`: 0-indexed position in the request
    fn on_document_start(&self, index: usize, total: usize, input: &Path) {
        let _ = (index, total, input);
    }

    /// Called when a document was converted.
    fn on_document_complete(&self, index: usize, total: usize, output: &Path) {
        let _ = (index, total, output);
    }

    /// Called before the merge stage runs.
    fn on_merge(&self, count: usize) {
        let _ = count;
    }

    /// Called before the normalisation stage runs.
    ///
    /// * `count`: number of PDFs that will be normalised
    fn on_normalize(&self, count: usize) {
        let _ = count;
    }

    /// Called once the outputs are registered.
    fn on_conversion_complete(&self, outputs: &[PathBuf]) {
        let _ = outputs;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::Pipeline`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        merges: AtomicUsize,
        outputs: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_document_start(&self, _index: usize, _total: usize, _input: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _index: usize, _total: usize, _output: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_merge(&self, _count: usize) {
            self.merges.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, outputs: &[PathBuf]) {
            self.outputs.store(outputs.len(), Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(2);
        cb.on_document_start(0, 2, Path::new("a.docx"));
        cb.on_document_complete(0, 2, Path::new("a.pdf"));
        cb.on_merge(2);
        cb.on_normalize(1);
        cb.on_conversion_complete(&[PathBuf::from("m.pdf")]);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_document_start(0, 2, Path::new("a.docx"));
        tracker.on_document_complete(0, 2, Path::new("a.pdf"));
        tracker.on_document_start(1, 2, Path::new("b.docx"));
        tracker.on_merge(2);
        tracker.on_conversion_complete(&[PathBuf::from("m.pdf")]);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.merges.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.outputs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
    }
}
