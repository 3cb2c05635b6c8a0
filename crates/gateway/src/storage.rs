//! Ephemeral files: uploads and the mask PNGs derived from them.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

/// Prefix put in front of every stored upload name.
pub const UPLOAD_TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S%.6f";

/// Reduce a client-supplied name to one safe path component.
///
/// Directories are stripped, characters outside `[A-Za-z0-9._-]` become `_`
/// and leading dots are removed. Returns `None` when nothing is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// A file written by [`UploadStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    /// File name without extension.
    pub filestring: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<timestamp><sanitized stem>` and the full stored file name.
    pub fn stored_name(now: DateTime<Local>, original: &str) -> (String, String) {
        let sanitized = sanitize_filename(original).unwrap_or_else(|| "upload".to_string());
        let (stem, extension) = match sanitized.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
            _ => (sanitized.as_str(), None),
        };
        let filestring = format!("{}{stem}", now.format(UPLOAD_TIMESTAMP_FORMAT));
        let filename = match extension {
            Some(extension) => format!("{filestring}.{}", extension.to_ascii_lowercase()),
            None => filestring.clone(),
        };
        (filestring, filename)
    }

    pub async fn store(&self, original: &str, bytes: &[u8]) -> io::Result<StoredUpload> {
        let (filestring, filename) = Self::stored_name(Local::now(), original);
        let path = self.dir.join(filename);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(StoredUpload { path, filestring })
    }

    pub fn masks_path(&self, filestring: &str) -> PathBuf {
        self.dir.join(format!("{filestring}_masks.png"))
    }

    /// Path of a stored file, if `filename` is a safe single component.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        sanitize_filename(filename)
            .filter(|clean| clean == filename)
            .map(|clean| self.dir.join(clean))
    }
}

/// Delete `path`, logging instead of failing.
pub async fn remove_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed stale file"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cells.png").as_deref(), Some("cells.png"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\data\\a b.tif").as_deref(), Some("a_b.tif"));
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
        assert_eq!(sanitize_filename("..").as_deref(), None);
        assert_eq!(sanitize_filename("dir/").as_deref(), None);
    }

    #[test]
    fn test_stored_name_has_timestamp_prefix() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let (filestring, filename) = UploadStore::stored_name(now, "My Cells.PNG");
        assert_eq!(filestring, "2024_03_09_14_05_07.000000My_Cells");
        assert_eq!(filename, "2024_03_09_14_05_07.000000My_Cells.png");

        let (filestring, filename) = UploadStore::stored_name(now, "noext");
        assert_eq!(filestring, filename);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = UploadStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("a.png"),
            Some(PathBuf::from("/srv/uploads/a.png"))
        );
        assert!(store.resolve("../a.png").is_none());
        assert!(store.resolve("a b.png").is_none());
        assert_eq!(
            store.masks_path("x"),
            PathBuf::from("/srv/uploads/x_masks.png")
        );
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store.store("cells.png", b"abc").await.unwrap();
        assert!(stored.path.starts_with(dir.path()));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"abc");

        remove_best_effort(&stored.path).await;
        assert!(!stored.path.exists());

        // Second removal fails quietly.
        remove_best_effort(&stored.path).await;
    }
}
