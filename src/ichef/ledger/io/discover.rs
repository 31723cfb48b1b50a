use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ichef::ledger::error::Result;
use crate::ichef::ledger::schema::{
    ORDER_FILE_MARKERS, PRODUCT_FILE_MARKERS, REWARD_CARDS_MARKER, REWARD_POINTS_MARKER,
};

/// Source files waiting to be synced, each group in filename order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intake {
    pub product_files: Vec<PathBuf>,
    pub order_files: Vec<PathBuf>,
    pub reward_files: Vec<PathBuf>,
}

impl Intake {
    pub fn is_empty(&self) -> bool {
        self.product_files.is_empty() && self.order_files.is_empty() && self.reward_files.is_empty()
    }
}

/// Classifies the spreadsheets in `downloads` and the snapshot CSVs in
/// `rewards`. Missing directories contribute nothing.
pub fn discover(downloads: &Path, rewards: &Path) -> Result<Intake> {
    let mut intake = Intake::default();

    for path in list_files(downloads)? {
        let name = file_name(&path);
        if !name.contains(".xls") {
            continue;
        }
        if PRODUCT_FILE_MARKERS.iter().any(|marker| name.contains(marker)) {
            intake.product_files.push(path);
        } else if ORDER_FILE_MARKERS.iter().any(|marker| name.contains(marker)) {
            intake.order_files.push(path);
        } else {
            debug!(file = %name, "ignoring unrecognised spreadsheet");
        }
    }

    for path in list_files(rewards)? {
        let name = file_name(&path);
        if name.ends_with(".csv")
            && (name.contains(REWARD_CARDS_MARKER) || name.contains(REWARD_POINTS_MARKER))
        {
            intake.reward_files.push(path);
        }
    }

    Ok(intake)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
