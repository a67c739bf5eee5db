//! Pipeline stages for document conversion.
//!
//! Each submodule implements exactly one step. Stages hand an
//! [`crate::output::ArtifactSet`] to the next one; none of them re-checks the
//! caller's options, they only read the [`ConversionPlan`] resolved by
//! [`validate`].
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ dispatch ──▶ merge ──▶ normalize ──▶ assemble
//! (options)   (converter)  (engine)   (engine)     (registrar)
//! ```
//!
//! 1. [`validate`] : reject contradictory options, resolve the plan
//! 2. [`dispatch`] : convert every input, one at a time, fail-fast
//! 3. [`merge`]    : combine the PDFs when merging applies
//! 4. [`normalize`]: deferred PDF/A / PDF/UA conversion of whatever merge
//!    left behind
//! 5. [`assemble`] : register the outputs with the result sink

pub mod assemble;
pub mod dispatch;
pub mod merge;
pub mod normalize;
pub mod validate;

pub use validate::{validate, ConversionPlan, FormatPlan};
