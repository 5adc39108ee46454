use std::path::{Path, PathBuf};

use tempfile::{TempDir, TempPath};
use tracing::{debug, warn};

use crate::error::Result;

/// Private temp directory for one pipeline run, removed when dropped
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("reel-composer-").tempdir()?;
        debug!("Created scratch space {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Staging file for an output path.
///
/// The encoder writes to [`OutputGuard::path`], a temp file next to the
/// destination. [`OutputGuard::commit`] renames it over the destination; if the
/// guard is dropped first the staging file is removed and the destination is
/// left exactly as it was.
pub struct OutputGuard {
    staging: Option<TempPath>,
    destination: PathBuf,
}

impl OutputGuard {
    pub fn stage<P: Into<PathBuf>>(destination: P) -> Result<Self> {
        let destination = destination.into();
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staging = tempfile::Builder::new()
            .prefix(".reel-composer-")
            .suffix(".mp4")
            .tempfile_in(dir)?
            .into_temp_path();
        debug!("Staging {:?} at {:?}", destination, &*staging);

        Ok(Self {
            staging: Some(staging),
            destination,
        })
    }

    /// Where the encoder should write
    pub fn path(&self) -> &Path {
        self.staging.as_deref().unwrap_or(&self.destination)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Move the staged file onto the destination
    pub fn commit(mut self) -> Result<PathBuf> {
        if let Some(staging) = self.staging.take() {
            staging.persist(&self.destination).map_err(|e| e.error)?;
        }
        Ok(std::mem::take(&mut self.destination))
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        let Some(staging) = self.staging.take() else {
            return;
        };
        let path = staging.to_path_buf();
        match staging.close() {
            Ok(()) => debug!("Discarded staged output {:?}", path),
            Err(e) => warn!("Failed to remove staged output {:?}: {}", path, e),
        }
    }
}
