//! Question image storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use qanda_core::{CoreError, CoreResult};

/// Image extensions accepted for question attachments.
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Blob store for question images. Failures surface as `StorageError` and
/// must never corrupt the question record.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores image bytes under a name derived from `stored_stem` plus the
    /// original file's extension, returning the stored name.
    async fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        stored_stem: &str,
    ) -> CoreResult<String>;
}

/// Stores images as files under a root directory.
pub struct FileSystemImageStore {
    root: PathBuf,
}

impl FileSystemImageStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for FileSystemImageStore {
    async fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        stored_stem: &str,
    ) -> CoreResult<String> {
        if bytes.is_empty() {
            return Err(CoreError::StorageError(
                "refusing to store an empty upload".to_string(),
            ));
        }

        let extension = file_extension(original_name);
        if !ALLOWED_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            return Err(CoreError::StorageError(format!(
                "file type not allowed: {original_name}"
            )));
        }

        let stored_name = format!("{stored_stem}.{extension}");
        let destination = self.root.join(&stored_name);
        // The stem is generated by the caller, but refuse traversal anyway.
        if destination
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CoreError::StorageError(
                "cannot store a file outside the image directory".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::StorageError(format!("creating image directory: {e}")))?;
        tokio::fs::write(&destination, bytes)
            .await
            .map_err(|e| CoreError::StorageError(format!("writing {stored_name}: {e}")))?;

        Ok(stored_name)
    }
}

fn file_extension(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}
