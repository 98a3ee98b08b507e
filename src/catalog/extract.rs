use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to extract text from {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: pdf_extract::OutputError,
    },
    #[error("pdf extraction task failed: {0}")]
    Task(String),
}

/// Extract the plain-text content of a PDF already written to disk.
///
/// Decoding runs on the blocking pool; the extraction engine's state is
/// dropped before this returns, success or failure. A corrupt or
/// unreadable PDF is an error, never silently-empty content.
pub async fn extract_text(pdf_path: &Path) -> Result<String, ExtractError> {
    let path: PathBuf = pdf_path.to_path_buf();
    let display = path.display().to_string();
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(source)) => Err(ExtractError::Unreadable {
            path: display,
            source,
        }),
        Err(join_err) => Err(ExtractError::Task(join_err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn corrupt_pdf_surfaces_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 this is not a real pdf body").unwrap();

        let err = extract_text(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("failed to extract text"));
    }

    #[tokio::test]
    async fn missing_file_surfaces_an_error() {
        assert!(extract_text(Path::new("/nonexistent/doc.pdf"))
            .await
            .is_err());
    }
}
