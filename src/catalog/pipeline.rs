//! Create / update / delete orchestration for the catalog.
//!
//! Requests arrive here already decoded into tagged structures, so every
//! validation that needs no filesystem access has happened before the
//! first side effect. File writes and the repository write are not
//! transactional together: a failure after storage can leave an orphaned
//! file behind.

use super::extract;
use super::repository::ContentRepository;
use super::schema::{Category, ContentItem, ContentKind};
use super::storage::{FileKind, FileStore, StoreError};
use crate::error::ApiError;
use chrono::Utc;
use uuid::Uuid;

/// One decoded multipart file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// The content source of a new item. The upload form's loose field bag is
/// narrowed to exactly one of these before dispatch.
#[derive(Debug)]
pub enum NewContentBody {
    Video { video: Option<UploadedFile> },
    BlogFromPdf { pdf: UploadedFile },
    BlogFromText { body: String },
}

impl NewContentBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Video { .. } => ContentKind::Video,
            Self::BlogFromPdf { .. } | Self::BlogFromText { .. } => ContentKind::Blog,
        }
    }
}

/// A validated create request.
#[derive(Debug)]
pub struct NewContent {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub thumbnail: Option<UploadedFile>,
    pub body: NewContentBody,
}

/// A partial update; `None` fields keep their prior values. A supplied
/// `pdf` wins over `blog_content`, mirroring the create path.
#[derive(Debug, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ContentKind>,
    pub category: Option<Category>,
    pub blog_content: Option<String>,
    pub pdf: Option<UploadedFile>,
    pub video: Option<UploadedFile>,
    pub thumbnail: Option<UploadedFile>,
}

/// Orchestrates validation, file placement, PDF extraction, and repository
/// writes for admin mutations.
#[derive(Clone)]
pub struct ContentPipeline {
    repo: ContentRepository,
    store: FileStore,
}

impl ContentPipeline {
    pub fn new(repo: ContentRepository, store: FileStore) -> Self {
        Self { repo, store }
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.repo
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Create one content item on behalf of `admin_id`.
    pub async fn create(&self, admin_id: &str, form: NewContent) -> Result<ContentItem, ApiError> {
        let kind = form.body.kind();

        let thumbnail_path = match &form.thumbnail {
            Some(file) => Some(self.store_file(FileKind::Thumbnail, file).await?),
            None => None,
        };

        let (video_path, blog_content) = match form.body {
            NewContentBody::Video { video } => {
                let path = match &video {
                    Some(file) => Some(self.store_file(FileKind::Video, file).await?),
                    None => None,
                };
                (path, None)
            }
            NewContentBody::BlogFromPdf { pdf } => {
                (None, Some(self.store_and_extract(&pdf).await?))
            }
            NewContentBody::BlogFromText { body } => (None, Some(body)),
        };

        let item = ContentItem {
            id: Uuid::new_v4().to_string(),
            title: form.title,
            description: form.description,
            blog_content,
            video_path,
            thumbnail_path,
            kind,
            category: form.category,
            uploaded_by: Some(admin_id.to_string()),
            created_at: Utc::now(),
        };
        self.repo.insert(&item)?;
        tracing::info!(id = %item.id, kind = %item.kind, "content created");
        Ok(item)
    }

    /// Apply a partial update. Unknown ids fail before any mutation.
    pub async fn update(&self, id: &str, patch: ContentPatch) -> Result<ContentItem, ApiError> {
        let mut item = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Content not found"))?;

        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(description) = patch.description {
            item.description = Some(description);
        }
        if let Some(kind) = patch.kind {
            item.kind = kind;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }

        if let Some(pdf) = &patch.pdf {
            item.blog_content = Some(self.store_and_extract(pdf).await?);
        } else if let Some(text) = patch.blog_content {
            // Direct text overwrites literally, including to empty.
            item.blog_content = Some(text);
        }

        if let Some(video) = &patch.video {
            if let Some(old) = item.video_path.take() {
                self.store.delete(&old).await.map_err(store_error)?;
            }
            item.video_path = Some(self.store_file(FileKind::Video, video).await?);
        }
        if let Some(thumbnail) = &patch.thumbnail {
            if let Some(old) = item.thumbnail_path.take() {
                self.store.delete(&old).await.map_err(store_error)?;
            }
            item.thumbnail_path = Some(self.store_file(FileKind::Thumbnail, thumbnail).await?);
        }

        if !self.repo.update(&item)? {
            return Err(ApiError::not_found("Content not found"));
        }
        tracing::info!(id = %item.id, "content updated");
        Ok(item)
    }

    /// Delete an item and its referenced binaries. Extracted PDF sources
    /// are not tracked on the record, so they stay behind.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let item = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Content not found"))?;

        if let Some(path) = &item.video_path {
            self.store.delete(path).await.map_err(store_error)?;
        }
        if let Some(path) = &item.thumbnail_path {
            self.store.delete(path).await.map_err(store_error)?;
        }
        if !self.repo.delete(id)? {
            return Err(ApiError::not_found("Content not found"));
        }
        tracing::info!(%id, "content deleted");
        Ok(())
    }

    async fn store_file(&self, kind: FileKind, file: &UploadedFile) -> Result<String, ApiError> {
        self.store
            .store(kind, &file.name, &file.data)
            .await
            .map_err(store_error)
    }

    async fn store_and_extract(&self, pdf: &UploadedFile) -> Result<String, ApiError> {
        let rel = self.store_file(FileKind::Pdf, pdf).await?;
        let abs = self.store.absolute_path(&rel);
        extract::extract_text(&abs)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))
    }
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::DisallowedExtension { .. } => ApiError::validation(err.to_string()),
        StoreError::Io(_) => ApiError::internal(err.to_string()),
    }
}
