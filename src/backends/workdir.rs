//! Filesystem-backed path allocation and result registration.

use crate::error::RegistrarError;
use crate::ports::{PathAllocator, ResultRegistrar};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;
use tracing::{debug, info};
use uuid::Uuid;

/// Per-request working directory. Removed with everything in it on drop.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create a working directory under the system temp dir.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("office-convert-").tempdir()?;
        Ok(Self { dir })
    }

    /// Create a working directory under `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("office-convert-")
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl PathAllocator for WorkDir {
    fn new_path(&self, extension: &str) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}{}", Uuid::new_v4(), extension))
    }
}

/// Copies registered outputs into a destination directory.
///
/// A single output is named `{basename}{ext}`; several outputs are named
/// `{basename}_{n}{ext}`, numbered from 1 in registration order. Files with
/// the same name already in the directory are replaced.
///
/// One registrar serves one request: it accepts a single successful
/// registration. Outputs are staged under temporary names and only renamed
/// into place once every copy succeeded, so a failed registration leaves
/// nothing behind.
#[derive(Debug)]
pub struct OutputDirRegistrar {
    dir: PathBuf,
    basename: String,
    max_outputs: Option<usize>,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    /// A registration is in progress or has completed.
    claimed: bool,
    registered: Vec<PathBuf>,
}

impl OutputDirRegistrar {
    pub fn new(dir: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            basename: basename.into(),
            max_outputs: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Refuse registrations of more than `limit` outputs.
    pub fn with_max_outputs(mut self, limit: usize) -> Self {
        self.max_outputs = Some(limit);
        self
    }

    /// Destination paths written so far.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.state().registered.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn target_name(&self, source: &Path, index: usize, total: usize) -> String {
        let ext = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        if total == 1 {
            format!("{}{}", self.basename, ext)
        } else {
            format!("{}_{}{}", self.basename, index + 1, ext)
        }
    }

    /// Copy every source next to its target, then rename all of them.
    async fn write_all(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, RegistrarError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RegistrarError::Io {
                path: self.dir.clone(),
                source: e,
            })?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(paths.len());
        for (i, source) in paths.iter().enumerate() {
            let part = self.dir.join(format!(".{}.part", Uuid::new_v4()));
            if let Err(e) = tokio::fs::copy(source, &part).await {
                remove_all(staged.iter().map(|(p, _)| p).chain([&part])).await;
                return Err(RegistrarError::Io {
                    path: source.clone(),
                    source: e,
                });
            }
            let target = self.dir.join(self.target_name(source, i, paths.len()));
            staged.push((part, target));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (n, (part, target)) in staged.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(part, target).await {
                remove_all(written.iter().chain(staged[n..].iter().map(|(p, _)| p))).await;
                return Err(RegistrarError::Io {
                    path: target.clone(),
                    source: e,
                });
            }
            debug!("{} → {}", part.display(), target.display());
            written.push(target.clone());
        }
        Ok(written)
    }
}

/// Best-effort removal of files written by a failed registration.
async fn remove_all<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl ResultRegistrar for OutputDirRegistrar {
    async fn register(&self, paths: &[PathBuf]) -> Result<(), RegistrarError> {
        if let Some(limit) = self.max_outputs {
            if paths.len() > limit {
                return Err(RegistrarError::CapacityExceeded {
                    requested: paths.len(),
                    limit,
                });
            }
        }

        {
            let mut state = self.state();
            if state.claimed {
                return Err(RegistrarError::AlreadyRegistered);
            }
            state.claimed = true;
        }

        let result = self.write_all(paths).await;
        let mut state = self.state();
        match result {
            Ok(written) => {
                info!("Wrote {} output(s) to {}", written.len(), self.dir.display());
                state.registered = written;
                Ok(())
            }
            Err(e) => {
                state.claimed = false;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allocated_paths_are_unique_and_inside_the_workdir() {
        let work = WorkDir::new().unwrap();
        let paths: HashSet<_> = (0..50).map(|_| work.new_path(".pdf")).collect();
        assert_eq!(paths.len(), 50);
        for p in &paths {
            assert!(p.starts_with(work.path()));
            assert_eq!(p.extension().unwrap(), "pdf");
        }
    }

    #[test]
    fn workdir_is_removed_on_drop() {
        let work = WorkDir::new().unwrap();
        let dir = work.path().to_path_buf();
        assert!(dir.exists());
        drop(work);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn single_output_uses_basename() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("x.pdf");
        std::fs::write(&a, b"%PDF-1.7").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "report");
        registrar.register(&[a]).await.unwrap();

        let out = dst.path().join("report.pdf");
        assert_eq!(registrar.registered(), vec![out.clone()]);
        assert_eq!(std::fs::read(out).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn several_outputs_are_numbered_in_order() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.html");
        let b = src.path().join("b.html");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "second").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "result");
        registrar.register(&[a, b]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dst.path().join("result_1.html")).unwrap(),
            "first"
        );
        assert_eq!(
            std::fs::read_to_string(dst.path().join("result_2.html")).unwrap(),
            "second"
        );
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let dst = tempfile::tempdir().unwrap();
        let registrar = OutputDirRegistrar::new(dst.path(), "r").with_max_outputs(1);
        let err = registrar
            .register(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrarError::CapacityExceeded { requested: 2, limit: 1 }
        ));
        assert!(registrar.registered().is_empty());
    }

    #[tokio::test]
    async fn missing_source_is_an_io_error() {
        let dst = tempfile::tempdir().unwrap();
        let registrar = OutputDirRegistrar::new(dst.path(), "r");
        let err = registrar
            .register(&[dst.path().join("missing.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Io { .. }));
    }

    fn entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn failed_copy_leaves_destination_empty() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.pdf");
        std::fs::write(&a, b"%PDF-1.7").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "r");
        let err = registrar
            .register(&[a, src.path().join("missing.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrarError::Io { .. }));
        assert!(registrar.registered().is_empty());
        assert!(entries(dst.path()).is_empty(), "{:?}", entries(dst.path()));
    }

    #[tokio::test]
    async fn failed_registration_can_be_retried() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.pdf");
        std::fs::write(&a, b"%PDF-1.7").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "r");
        assert!(registrar
            .register(&[src.path().join("missing.pdf")])
            .await
            .is_err());
        registrar.register(&[a]).await.unwrap();

        assert_eq!(registrar.registered(), vec![dst.path().join("r.pdf")]);
    }

    #[tokio::test]
    async fn second_registration_is_rejected() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.pdf");
        let b = src.path().join("b.pdf");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "second").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "r");
        registrar.register(&[a]).await.unwrap();
        let err = registrar.register(&[b]).await.unwrap_err();

        assert!(matches!(err, RegistrarError::AlreadyRegistered));
        assert_eq!(entries(dst.path()), vec!["r.pdf".to_string()]);
        assert_eq!(std::fs::read_to_string(dst.path().join("r.pdf")).unwrap(), "first");
    }

    #[tokio::test]
    async fn concurrent_registrations_claim_once() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.pdf");
        let b = src.path().join("b.pdf");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "second").unwrap();

        let registrar = OutputDirRegistrar::new(dst.path(), "r").with_max_outputs(1);
        let a = [a];
        let b = [b];
        let (first, second) = tokio::join!(registrar.register(&a), registrar.register(&b));

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        assert_eq!(registrar.registered().len(), 1);
        assert_eq!(entries(dst.path()).len(), 1);
    }

    #[tokio::test]
    async fn existing_files_are_replaced() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.pdf");
        std::fs::write(&a, "new").unwrap();
        std::fs::write(dst.path().join("r.pdf"), "old").unwrap();

        OutputDirRegistrar::new(dst.path(), "r")
            .register(&[a])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(dst.path().join("r.pdf")).unwrap(), "new");
        assert_eq!(entries(dst.path()), vec!["r.pdf".to_string()]);
    }
}
