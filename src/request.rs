//! The unit of work handed to [`crate::Pipeline::run`].

use crate::config::ConversionOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered input documents plus the caller's declared options.
///
/// Fields are private: once built, a request is only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    inputs: Vec<PathBuf>,
    options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new<I, P>(inputs: I, options: ConversionOptions) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            options,
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }
}
