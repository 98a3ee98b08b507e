//! Multipart form decoding.
//!
//! The upload form arrives as a loose bag of text and file fields. It is
//! narrowed here into the tagged request structures the pipeline takes,
//! so all shape validation happens before any side effect.

use crate::catalog::{
    Category, ContentKind, ContentPatch, FileKind, NewContent, NewContentBody, UploadedFile,
};
use crate::error::ApiError;
use axum::extract::multipart::{Multipart, MultipartError};

#[derive(Debug, Default)]
struct RawForm {
    title: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    blog_content: Option<String>,
    video: Option<UploadedFile>,
    thumbnail: Option<UploadedFile>,
    pdf: Option<UploadedFile>,
}

async fn read_raw(mut multipart: Multipart) -> Result<RawForm, ApiError> {
    let mut raw = RawForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => raw.title = Some(field.text().await.map_err(bad_part)?),
            "description" => raw.description = Some(field.text().await.map_err(bad_part)?),
            "type" => raw.kind = Some(field.text().await.map_err(bad_part)?),
            "category" => raw.category = Some(field.text().await.map_err(bad_part)?),
            "blogContent" => raw.blog_content = Some(field.text().await.map_err(bad_part)?),
            "video" | "thumbnail" | "pdf" => {
                let file = UploadedFile {
                    name: field.file_name().unwrap_or_default().to_string(),
                    data: field.bytes().await.map_err(bad_part)?.to_vec(),
                };
                match name.as_str() {
                    "video" => raw.video = Some(file),
                    "thumbnail" => raw.thumbnail = Some(file),
                    _ => raw.pdf = Some(file),
                }
            }
            // Unknown fields are drained and dropped.
            _ => {
                let _ = field.bytes().await.map_err(bad_part)?;
            }
        }
    }
    Ok(raw)
}

/// Reject any file whose extension is not allowed for its field, before a
/// single byte is stored.
fn validate_files(raw: &RawForm) -> Result<(), ApiError> {
    let checks = [
        (FileKind::Video, raw.video.as_ref()),
        (FileKind::Thumbnail, raw.thumbnail.as_ref()),
        (FileKind::Pdf, raw.pdf.as_ref()),
    ];
    for (kind, file) in checks {
        if let Some(file) = file {
            kind.validate_name(&file.name)
                .map_err(|e| ApiError::validation(e.to_string()))?;
        }
    }
    Ok(())
}

/// Decode and validate a create request.
pub async fn read_create(multipart: Multipart) -> Result<NewContent, ApiError> {
    let raw = read_raw(multipart).await?;
    validate_files(&raw)?;

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Title is required"))?
        .to_string();
    let kind = parse_kind(raw.kind.as_deref())?.unwrap_or_default();
    let category = parse_category(raw.category.as_deref())?.unwrap_or_default();

    let body = match kind {
        // A stray pdf or blogContent on a video upload is ignored; the
        // blog fields only mean something for BLOG items.
        ContentKind::Video => NewContentBody::Video { video: raw.video },
        ContentKind::Blog => {
            if let Some(pdf) = raw.pdf {
                // The PDF wins over any inline text.
                NewContentBody::BlogFromPdf { pdf }
            } else {
                match raw.blog_content.filter(|t| !t.trim().is_empty()) {
                    Some(body) => NewContentBody::BlogFromText { body },
                    None => {
                        return Err(ApiError::validation(
                            "A blog needs either a PDF file or blog content",
                        ))
                    }
                }
            }
        }
    };

    Ok(NewContent {
        title,
        description: raw.description,
        category,
        thumbnail: raw.thumbnail,
        body,
    })
}

/// Decode a partial update. Empty text fields count as "not supplied",
/// except `blogContent`, which may be cleared explicitly.
pub async fn read_patch(multipart: Multipart) -> Result<ContentPatch, ApiError> {
    let raw = read_raw(multipart).await?;
    validate_files(&raw)?;
    Ok(ContentPatch {
        title: raw.title.filter(|t| !t.trim().is_empty()),
        description: raw.description.filter(|t| !t.trim().is_empty()),
        kind: parse_kind(raw.kind.as_deref())?,
        category: parse_category(raw.category.as_deref())?,
        blog_content: raw.blog_content,
        pdf: raw.pdf,
        video: raw.video,
        thumbnail: raw.thumbnail,
    })
}

fn parse_kind(raw: Option<&str>) -> Result<Option<ContentKind>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<ContentKind>()
            .map(Some)
            .map_err(|e| ApiError::validation(e.to_string())),
    }
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<Category>()
            .map(Some)
            .map_err(|e| ApiError::validation(e.to_string())),
    }
}

fn bad_part(err: MultipartError) -> ApiError {
    ApiError::validation(format!("malformed multipart request: {err}"))
}
