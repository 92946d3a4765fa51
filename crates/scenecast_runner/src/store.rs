use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cast_logging::{cast_debug, cast_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{atomic_write, ensure_output_dir, PersistError};
use crate::record::{Operation, OperationStatus};

const STATE_FILENAME: &str = ".scenecast_state.ron";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize state record: {0}")]
    Serialize(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// The single durable record shared by the runner and the front end.
///
/// Every field is optional; a missing state file reads as the all-default
/// record, so fields come into existence on first write. The store offers
/// per-field last-write-wins and nothing stronger; the reconciler's
/// compare-before-adopt discipline is what stands in for a lock.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredRecord {
    // Job slots. Only the runner writes these once a job has started; the
    // front end clears them on an explicit user cancel.
    #[serde(default)]
    pub operation: Option<Operation>,
    #[serde(default)]
    pub operation_error: Option<String>,
    #[serde(default)]
    pub transformed_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    // Draft slots, owned by the front end. The mirror fields hold the
    // last result URLs the user has already seen.
    #[serde(default)]
    pub captured_image: Option<String>,
    #[serde(default)]
    pub transform_prompt: Option<String>,
    #[serde(default)]
    pub video_prompt: Option<String>,
    #[serde(default)]
    pub video_duration: Option<String>,
    #[serde(default)]
    pub generate_audio: Option<bool>,
    #[serde(default)]
    pub mirror_transformed_url: Option<String>,
    #[serde(default)]
    pub mirror_video_url: Option<String>,
    #[serde(default)]
    pub saved_utc: Option<String>,
}

/// One full write of the draft slots. `None` clears a slot; the front end
/// always saves the complete draft, matching last-write-wins per field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftFields {
    pub captured_image: Option<String>,
    pub transform_prompt: Option<String>,
    pub video_prompt: Option<String>,
    pub video_duration: Option<String>,
    pub generate_audio: Option<bool>,
    pub mirror_transformed_url: Option<String>,
    pub mirror_video_url: Option<String>,
    pub saved_utc: Option<String>,
}

/// File-backed key-value record with atomic rewrite on every mutation.
/// Cheap to share behind an `Arc`; all access goes through one mutex.
pub struct StateStore {
    dir: PathBuf,
    record: Mutex<StoredRecord>,
}

impl StateStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    /// A missing state file is normal; an unreadable one is logged and
    /// replaced by defaults on the next write.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        ensure_output_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            record: Mutex::new(load_record(dir)),
        })
    }

    /// Pure read of the job slots; no side effects.
    pub fn status(&self) -> OperationStatus {
        let record = self.lock();
        OperationStatus {
            operation: record.operation,
            error: record.operation_error.clone(),
            transformed_url: record.transformed_url.clone(),
            video_url: record.video_url.clone(),
        }
    }

    pub fn snapshot(&self) -> StoredRecord {
        self.lock().clone()
    }

    /// Marks a job of the given kind in progress and clears any prior error.
    pub fn begin_operation(&self, operation: Operation) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.operation = Some(operation);
            record.operation_error = None;
        })
    }

    pub fn complete_transform(&self, url: String) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.transformed_url = Some(url);
            record.operation = None;
            record.operation_error = None;
        })
    }

    pub fn complete_video(&self, url: String) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.video_url = Some(url);
            record.operation = None;
            record.operation_error = None;
        })
    }

    pub fn fail_operation(&self, message: String) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.operation = None;
            record.operation_error = Some(message);
        })
    }

    /// User-initiated cancel: force-clears the operation and error slots.
    /// Result slots are left alone; an in-flight remote call may still
    /// complete and overwrite them.
    pub fn clear_operation(&self) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.operation = None;
            record.operation_error = None;
        })
    }

    /// Full overwrite of the draft slots. Job slots are untouched.
    pub fn update_draft(&self, draft: DraftFields) -> Result<(), StoreError> {
        self.mutate(|record| {
            record.captured_image = draft.captured_image;
            record.transform_prompt = draft.transform_prompt;
            record.video_prompt = draft.video_prompt;
            record.video_duration = draft.video_duration;
            record.generate_audio = draft.generate_audio;
            record.mirror_transformed_url = draft.mirror_transformed_url;
            record.mirror_video_url = draft.mirror_video_url;
            record.saved_utc = draft.saved_utc;
        })
    }

    fn mutate(&self, apply: impl FnOnce(&mut StoredRecord)) -> Result<(), StoreError> {
        let mut record = self.record.lock().expect("lock state record");
        apply(&mut record);
        self.write_locked(&record)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredRecord> {
        self.record.lock().expect("lock state record")
    }

    fn write_locked(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(record, pretty)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        atomic_write(&self.dir, STATE_FILENAME, content.as_bytes())?;
        Ok(())
    }
}

fn load_record(dir: &Path) -> StoredRecord {
    let path = dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return StoredRecord::default();
        }
        Err(err) => {
            cast_warn!("Failed to read state record from {:?}: {}", path, err);
            return StoredRecord::default();
        }
    };

    match ron::from_str(&content) {
        Ok(record) => {
            cast_debug!("Loaded state record from {:?}", path);
            record
        }
        Err(err) => {
            cast_warn!("Failed to parse state record from {:?}: {}", path, err);
            StoredRecord::default()
        }
    }
}
