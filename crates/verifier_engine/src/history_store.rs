use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;
use verifier_core::{HistoryDraft, HistoryEntry, HistoryLog};
use verifier_logging::{verifier_debug, verifier_warn};

pub const HISTORY_FILE: &str = "verification_history.json";

/// Produces the timestamp stamped onto each new entry.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history directory missing or not writable: {0}")]
    StorageDir(String),
    #[error("history file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Persists the newest-first verification log as a JSON array.
pub struct HistoryStore {
    dir: PathBuf,
    clock: Clock,
}

impl HistoryStore {
    pub fn new(dir: PathBuf, clock: Clock) -> Self {
        Self { dir, clock }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// Reads the stored log. A missing file is an empty log.
    pub fn try_load(&self) -> Result<HistoryLog, HistoryError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HistoryLog::default()),
            Err(err) => return Err(err.into()),
        };
        let entries: Vec<HistoryEntry> = serde_json::from_str(&raw)?;
        Ok(HistoryLog::from_entries(entries))
    }

    /// Like [`HistoryStore::try_load`], but an unreadable file yields an empty
    /// log and a warning.
    pub fn load(&self) -> HistoryLog {
        self.try_load().unwrap_or_else(|err| {
            verifier_warn!("ignoring stored history at {}: {err}", self.path().display());
            HistoryLog::default()
        })
    }

    /// Stamps `draft`, puts it at the head of the log and writes the log back.
    pub fn try_record(&self, draft: HistoryDraft) -> Result<HistoryLog, HistoryError> {
        let mut log = self.load();
        log.push(draft.stamp((self.clock)()));
        let content = serde_json::to_string_pretty(log.entries())?;
        write_atomic(&self.dir, HISTORY_FILE, &content)?;
        verifier_debug!("history now holds {} entries", log.len());
        Ok(log)
    }

    /// Records an entry; failures are logged and otherwise ignored.
    pub fn record(&self, draft: HistoryDraft) {
        if let Err(err) = self.try_record(draft) {
            verifier_warn!("could not save verification history: {err}");
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), HistoryError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| HistoryError::StorageDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(HistoryError::StorageDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| HistoryError::StorageDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file and a rename, so readers see
/// either the old or the new content.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<PathBuf, HistoryError> {
    ensure_dir(dir)?;

    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| HistoryError::Io(e.error))?;
    Ok(target)
}
