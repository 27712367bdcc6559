use crate::error::Error;
use bytes::Bytes;
use std::path::Path;

///
/// A report image or document, passed to the service as an opaque payload.
/// Type and size checks are left to the service.
///
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        UploadedDocument {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let content = tokio::fs::read(path).await.map_err(|source| Error::Document {
            path: path.display().to_string(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());

        Ok(UploadedDocument::new(file_name, content))
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_a_document_error() {
        let result = UploadedDocument::from_path("tests/fixtures/no-such-report.png").await;
        assert!(matches!(result, Err(Error::Document { .. })));
    }

    #[tokio::test]
    async fn reads_file_name_and_content() {
        let document = UploadedDocument::from_path("tests/fixtures/blood-report.txt")
            .await
            .unwrap();

        assert_eq!(document.file_name, "blood-report.txt");
        assert!(!document.is_empty());
    }
}
