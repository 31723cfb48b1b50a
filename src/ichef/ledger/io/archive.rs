use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::ichef::ledger::error::{Result, SyncError};

/// Moves a fully synced source file out of the intake location.
pub trait Archiver {
    fn archive(&self, path: &Path) -> Result<PathBuf>;
}

/// Renames files into `dir` as `<YYYYmmdd_HHMMSS>_<filename>`.
#[derive(Debug, Clone)]
pub struct DirectoryArchiver {
    dir: PathBuf,
}

impl DirectoryArchiver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Archiver for DirectoryArchiver {
    fn archive(&self, path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| SyncError::MissingInput(path.to_path_buf()))?;
        fs::create_dir_all(&self.dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let destination = self
            .dir
            .join(format!("{stamp}_{}", file_name.to_string_lossy()));
        fs::rename(path, &destination)?;
        info!(from = %path.display(), to = %destination.display(), "archived source file");
        Ok(destination)
    }
}
