//! Process-backed collaborators.
//!
//! These drive existing command-line tools; they do not convert or edit
//! documents themselves.
//!
//! | Type | Role | Tool |
//! |------|------|------|
//! | [`Soffice`] | [`DocumentConverter`], PDF/A / PDF/UA normalisation | LibreOffice `soffice` |
//! | [`Qpdf`] | merge | `qpdf` |
//! | [`MultiPdfEngine`] | tries engines in order | - |
//! | [`WorkDir`] | [`crate::ports::PathAllocator`] | temp dir |
//! | [`OutputDirRegistrar`] | [`crate::ports::ResultRegistrar`] | destination dir |

mod process;

pub mod multi;
pub mod qpdf;
pub mod soffice;
pub mod workdir;

pub use multi::MultiPdfEngine;
pub use qpdf::Qpdf;
pub use soffice::Soffice;
pub use workdir::{OutputDirRegistrar, WorkDir};

use crate::config::BackendConfig;
use crate::ports::{DocumentConverter, PdfEngine};
use std::sync::Arc;

/// LibreOffice as converter; qpdf then LibreOffice as PDF engines.
pub fn default_collaborators(
    config: &BackendConfig,
) -> (Arc<dyn DocumentConverter>, Arc<dyn PdfEngine>) {
    let soffice = Arc::new(Soffice::new(config));
    let engine = MultiPdfEngine::new(vec![
        Arc::new(Qpdf::new(config)) as Arc<dyn PdfEngine>,
        soffice.clone() as Arc<dyn PdfEngine>,
    ]);
    (soffice, Arc::new(engine))
}
