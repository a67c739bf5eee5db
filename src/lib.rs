//! # office-convert
//!
//! Convert batches of office documents to PDF or HTML, optionally merging the
//! PDFs and normalising them to PDF/A or PDF/UA.
//!
//! The library sequences calls to two collaborators, a **document
//! converter** and a **PDF engine**, behind the traits in [`ports`]. It
//! decides which option combinations are allowed, runs the stages in a fixed
//! order, and maps collaborator failures to caller-facing errors.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Validate   reject contradictory options, resolve a ConversionPlan
//!  ├─ 2. Convert    one document at a time → .pdf or .html (fail-fast)
//!  ├─ 3. Merge      N PDFs → 1, only when merge applies
//!  ├─ 4. Normalise  deferred PDF/A / PDF/UA, on the merged PDF or each PDF
//!  └─ 5. Register   hand the final paths to the result sink
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use office_convert::backends::{default_collaborators, OutputDirRegistrar, WorkDir};
//! use office_convert::{BackendConfig, ConversionOptions, ConversionRequest, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (converter, engine) = default_collaborators(&BackendConfig::default());
//!     let pipeline = Pipeline::new(converter, engine);
//!
//!     let options = ConversionOptions::builder().merge(true).pdfa("PDF/A-2b").build();
//!     let request = ConversionRequest::new(["a.docx", "b.xlsx"], options);
//!
//!     let work = WorkDir::new()?;
//!     let registrar = OutputDirRegistrar::new("out", "merged");
//!     let result = pipeline.run(&request, &work, &registrar).await?;
//!     println!("{} output(s)", result.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `office-convert` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backends;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod ports;
pub mod progress;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BackendConfig, BackendConfigBuilder, ConversionOptions, ConversionOptionsBuilder,
    FormatConversion, OutputFormat, PdfFormats,
};
pub use convert::{convert, Pipeline};
pub use error::{ConvertError, ConverterError, EngineError, ErrorKind, RegistrarError};
pub use output::{ConversionStats, FinalArtifactSet, IntermediateArtifact, Stage};
pub use pipeline::{ConversionPlan, FormatPlan};
pub use ports::{ConverterOptions, DocumentConverter, PathAllocator, PdfEngine, ResultRegistrar};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::ConversionRequest;
