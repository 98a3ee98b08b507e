use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Which upload field a file arrived under. Each kind has its own
/// destination directory and extension whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Thumbnail,
    Pdf,
}

impl FileKind {
    pub fn field(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Thumbnail => "thumbnail",
            Self::Pdf => "pdf",
        }
    }

    fn dir(self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Thumbnail => "thumbnails",
            Self::Pdf => "pdfs",
        }
    }

    fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Video => &["mp4", "mov", "avi", "mkv"],
            Self::Thumbnail => &["jpg", "jpeg", "png", "webp"],
            Self::Pdf => &["pdf"],
        }
    }

    /// Check an original filename against this kind's whitelist without
    /// storing anything.
    pub fn validate_name(self, original_name: &str) -> Result<(), StoreError> {
        checked_extension(self, original_name).map(|_| ())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid file type for {field}: {name:?}")]
    DisallowedExtension { field: &'static str, name: String },
    #[error("file store I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem-backed storage for uploaded binaries, one subdirectory per
/// file kind under the uploads root.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: &str) -> Self {
        let expanded = shellexpand::tilde(base_dir).to_string();
        Self {
            base_dir: PathBuf::from(expanded),
        }
    }

    /// Store file bytes, returning the relative path (always forward
    /// slashes) to record on the content item. The stored name is
    /// timestamp + random suffix with the original extension, so
    /// concurrent uploads of the same filename cannot collide.
    pub async fn store(
        &self,
        kind: FileKind,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StoreError> {
        let ext = checked_extension(kind, original_name)?;

        let dir = self.base_dir.join(kind.dir());
        fs::create_dir_all(&dir).await?;

        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        let stored_name = format!(
            "{}-{suffix}.{ext}",
            chrono::Utc::now().timestamp_millis()
        );
        fs::write(dir.join(&stored_name), data).await?;

        Ok(format!("{}/{stored_name}", kind.dir()))
    }

    /// Delete a stored file. Missing files are a no-op.
    pub async fn delete(&self, rel_path: &str) -> Result<(), StoreError> {
        let abs = self.base_dir.join(rel_path);
        match fs::remove_file(&abs).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute path for a stored relative path.
    pub fn absolute_path(&self, rel_path: &str) -> PathBuf {
        self.base_dir.join(rel_path)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Validate the original filename against the kind's whitelist and return
/// the lowercased extension.
fn checked_extension(kind: FileKind, original_name: &str) -> Result<String, StoreError> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if kind.allowed_extensions().contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StoreError::DisallowedExtension {
            field: kind.field(),
            name: original_name.to_string(),
        })
    }
}
