use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

/// What a session has uploaded and derived so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub upload_path: PathBuf,
    /// Stored file name without extension; prefix of derived files.
    pub filestring: String,
    pub masks_path: Option<PathBuf>,
}

/// In-memory session records keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<SessionRecord> {
        self.records.lock().ok()?.get(id).cloned()
    }

    /// Remove and return the record, so its files can be cleaned up before
    /// a replacement is written.
    pub fn take(&self, id: &str) -> Option<SessionRecord> {
        self.records.lock().ok()?.remove(id)
    }

    /// Overwrite the record for `id`.
    pub fn insert(&self, id: &str, record: SessionRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(id.to_string(), record);
        }
    }

    /// Attach a mask file to the record of `id`, provided it still holds the
    /// upload named `filestring`. Returns false when the session has no
    /// record or has moved on to another upload.
    pub fn set_masks_path(&self, id: &str, filestring: &str, path: PathBuf) -> bool {
        match self.records.lock() {
            Ok(mut records) => match records.get_mut(id) {
                Some(record) if record.filestring == filestring => {
                    record.masks_path = Some(path);
                    true
                }
                _ => false,
            },
            Err(_) => false,
        }
    }
}
