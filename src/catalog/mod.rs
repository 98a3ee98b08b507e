//! Catalog core: content records, binary storage, PDF extraction, the
//! admin upload pipeline, and derived-view filtering.

pub mod extract;
pub mod pipeline;
pub mod repository;
pub mod schema;
pub mod storage;
pub mod view;

pub use pipeline::{ContentPatch, ContentPipeline, NewContent, NewContentBody, UploadedFile};
pub use repository::ContentRepository;
pub use schema::{AdminAccount, Category, ContentItem, ContentKind, ListFilter, SortOrder};
pub use storage::{FileKind, FileStore};
