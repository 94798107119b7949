use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{RecordedDupes, RecordedIgnores};

/// The two JSON documents a dedupe session reads at start and overwrites at exit.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dupes_path: PathBuf,
    ignores_path: PathBuf,
}

impl RecordStore {
    pub fn new(dupes_path: impl Into<PathBuf>, ignores_path: impl Into<PathBuf>) -> Self {
        Self {
            dupes_path: dupes_path.into(),
            ignores_path: ignores_path.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.dupes_path(), config.ignores_path())
    }

    pub fn dupes_path(&self) -> &Path {
        &self.dupes_path
    }

    pub fn ignores_path(&self) -> &Path {
        &self.ignores_path
    }

    /// Load both records, starting empty where no file exists yet.
    ///
    /// Books are migrated to `separator` if the stored one differs.
    pub fn load(&self, separator: &str) -> Result<(RecordedDupes, RecordedIgnores)> {
        let mut dupes =
            load_json(&self.dupes_path)?.unwrap_or_else(|| RecordedDupes::new(separator));
        let mut ignores: RecordedIgnores = load_json(&self.ignores_path)?.unwrap_or_default();

        if let Some(old) = dupes.migrate_separator(separator)? {
            ignores.migrate_separator(&old, separator)?;
        }

        info!(
            authors = dupes.author_dupes.len(),
            books = dupes.book_dupes.len(),
            "Loaded resolved duplicates"
        );
        Ok((dupes, ignores))
    }

    /// Overwrite both files with the in-memory records.
    pub fn save(&self, dupes: &RecordedDupes, ignores: &RecordedIgnores) -> Result<()> {
        save_json(&self.dupes_path, dupes)?;
        save_json(&self.ignores_path, ignores)?;
        info!("Updated duplicates saved.");
        Ok(())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "No existing record, starting empty");
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write through a sibling temp file so an interrupted write leaves the old file intact.
fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
