use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::types::{Submission, SubmissionStatus};

pub const STORE_FILE_NAME: &str = "submissions.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),
}

/// Whole-collection access to stored submissions.
///
/// Every write replaces the full collection; there is no field-level
/// patching and no coordination between writers, so the last save wins.
pub trait SubmissionRepository {
    /// All stored submissions. A store that was never written is empty.
    fn load(&self) -> Result<Vec<Submission>, StorageError>;

    fn save(&self, submissions: &[Submission]) -> Result<(), StorageError>;

    fn insert(&self, submission: Submission) -> Result<Vec<Submission>, StorageError> {
        let mut all = self.load()?;
        all.push(submission);
        self.save(&all)?;
        Ok(all)
    }

    fn upsert_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<Vec<Submission>, StorageError> {
        let mut all = self.load()?;
        let entry = all
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::SubmissionNotFound(id.to_string()))?;
        entry.status = status;
        self.save(&all)?;
        Ok(all)
    }

    fn delete(&self, id: &str) -> Result<Vec<Submission>, StorageError> {
        let mut all = self.load()?;
        let before = all.len();
        all.retain(|s| s.id != id);
        if all.len() == before {
            return Err(StorageError::SubmissionNotFound(id.to_string()));
        }
        self.save(&all)?;
        Ok(all)
    }
}

/// Submissions kept as one JSON array in a single file.
pub struct JsonFileRepository {
    storage_path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    /// `<data dir>/<app>/submissions.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(crate::metadata::DATA_DIR_NAME).join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }
}

impl SubmissionRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Submission>, StorageError> {
        if !self.storage_path.exists() {
            tracing::debug!(path = %self.storage_path.display(), "no submission store yet");
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.storage_path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write through a temporary file and an atomic rename so a crash never
    /// leaves a half-written store behind.
    fn save(&self, submissions: &[Submission]) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.storage_path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        let content = serde_json::to_string_pretty(submissions)?;
        f.write_all(content.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, &self.storage_path)?;
        tracing::debug!(
            path = %self.storage_path.display(),
            count = submissions.len(),
            "saved submissions"
        );
        Ok(())
    }
}

/// In-process store, handy for dry runs and tests.
#[derive(Default)]
pub struct MemoryRepository {
    data: Mutex<Vec<Submission>>,
}

impl MemoryRepository {
    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            data: Mutex::new(submissions),
        }
    }
}

impl SubmissionRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Submission>, StorageError> {
        Ok(self.data.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, submissions: &[Submission]) -> Result<(), StorageError> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = submissions.to_vec();
        Ok(())
    }
}
