//! qpdf as merge engine.

use crate::backends::process::{self, Failure};
use crate::config::{BackendConfig, PdfFormats};
use crate::error::EngineError;
use crate::ports::PdfEngine;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// qpdf exits with 3 when it succeeded with warnings.
const EXIT_WARNINGS: i32 = 3;

#[derive(Debug, Clone)]
pub struct Qpdf {
    bin: PathBuf,
    timeout_secs: u64,
}

impl Qpdf {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            bin: config.qpdf_bin.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// `qpdf --empty --pages <inputs…> -- <output>`
fn merge_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--empty".into(), "--pages".into()];
    args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
    args.push("--".into());
    args.push(output.into());
    args
}

#[async_trait]
impl PdfEngine for Qpdf {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError> {
        let args = merge_args(inputs, output);
        let finished = process::run(&self.bin, &args, self.timeout_secs)
            .await
            .map_err(|f| match f {
                Failure::Spawn(e) => EngineError::Io(e),
                Failure::Timeout => EngineError::Timeout {
                    secs: self.timeout_secs,
                },
            })?;

        if finished.status.success() || finished.code() == EXIT_WARNINGS {
            debug!("qpdf: merged {} files into {}", inputs.len(), output.display());
            Ok(())
        } else {
            Err(EngineError::Process(finished.describe(&self.bin)))
        }
    }

    async fn normalize(
        &self,
        _formats: &PdfFormats,
        _input: &Path,
        _output: &Path,
    ) -> Result<(), EngineError> {
        Err(EngineError::PdfFormatNotSupported)
    }
}
