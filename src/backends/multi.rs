//! Chain several PDF engines behind one [`PdfEngine`].
//!
//! Engines are tried in order and the first success wins. When every engine
//! fails, the collected errors are returned together; normalisation reports
//! [`EngineError::PdfFormatNotSupported`] if at least one engine did.

use crate::config::PdfFormats;
use crate::error::EngineError;
use crate::ports::PdfEngine;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub struct MultiPdfEngine {
    engines: Vec<Arc<dyn PdfEngine>>,
}

impl MultiPdfEngine {
    pub fn new(engines: Vec<Arc<dyn PdfEngine>>) -> Self {
        Self { engines }
    }
}

fn collapse(mut errors: Vec<EngineError>) -> EngineError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        EngineError::Multiple(errors)
    }
}

#[async_trait]
impl PdfEngine for MultiPdfEngine {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError> {
        let mut errors = Vec::new();
        for (i, engine) in self.engines.iter().enumerate() {
            match engine.merge(inputs, output).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!("PDF engine #{i} could not merge: {e}");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            return Err(EngineError::OperationNotSupported { operation: "merge" });
        }
        Err(collapse(errors))
    }

    async fn normalize(
        &self,
        formats: &PdfFormats,
        input: &Path,
        output: &Path,
    ) -> Result<(), EngineError> {
        let mut errors = Vec::new();
        for (i, engine) in self.engines.iter().enumerate() {
            match engine.normalize(formats, input, output).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!("PDF engine #{i} could not convert to {formats}: {e}");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            return Err(EngineError::PdfFormatNotSupported);
        }
        Err(collapse(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Succeed,
        FormatNotSupported,
        Crash,
    }

    struct StubEngine {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl StubEngine {
        fn arc(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn outcome(&self) -> Result<(), EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::FormatNotSupported => Err(EngineError::PdfFormatNotSupported),
                Behaviour::Crash => Err(EngineError::Process("crashed".into())),
            }
        }
    }

    #[async_trait]
    impl PdfEngine for StubEngine {
        async fn merge(&self, _: &[PathBuf], _: &Path) -> Result<(), EngineError> {
            self.outcome()
        }

        async fn normalize(&self, _: &PdfFormats, _: &Path, _: &Path) -> Result<(), EngineError> {
            self.outcome()
        }
    }

    fn formats() -> PdfFormats {
        PdfFormats::new("PDF/A-2b", false)
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let first = StubEngine::arc(Behaviour::Crash);
        let second = StubEngine::arc(Behaviour::Succeed);
        let third = StubEngine::arc(Behaviour::Succeed);
        let multi = MultiPdfEngine::new(vec![
            first.clone() as Arc<dyn PdfEngine>,
            second.clone() as Arc<dyn PdfEngine>,
            third.clone() as Arc<dyn PdfEngine>,
        ]);

        multi.merge(&[], Path::new("out.pdf")).await.unwrap();
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn any_format_rejection_is_reported() {
        let multi = MultiPdfEngine::new(vec![
            StubEngine::arc(Behaviour::Crash) as Arc<dyn PdfEngine>,
            StubEngine::arc(Behaviour::FormatNotSupported) as Arc<dyn PdfEngine>,
        ]);
        let err = multi
            .normalize(&formats(), Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(err.is_format_not_supported());
        assert!(err.to_string().contains("crashed"));
    }

    #[tokio::test]
    async fn plain_failures_stay_plain() {
        let multi = MultiPdfEngine::new(vec![StubEngine::arc(Behaviour::Crash) as Arc<dyn PdfEngine>]);
        let err = multi
            .normalize(&formats(), Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Process(_)));
    }

    #[tokio::test]
    async fn empty_chain_supports_nothing() {
        let multi = MultiPdfEngine::new(Vec::new());
        assert!(multi
            .normalize(&formats(), Path::new("in.pdf"), Path::new("out.pdf"))
            .await
            .unwrap_err()
            .is_format_not_supported());
        assert!(matches!(
            multi.merge(&[], Path::new("out.pdf")).await,
            Err(EngineError::OperationNotSupported { .. })
        ));
    }
}
