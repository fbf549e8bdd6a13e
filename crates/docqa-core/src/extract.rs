//! PDF text extraction
//!
//! Wraps the pdf-extract crate. Each file is parsed on the blocking pool so a
//! large document does not stall the runtime; the first failure (or parser
//! panic) fails the whole batch.

use anyhow::Context;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::error::ExtractError;
use crate::wire::ExtractResponse;

pub const MAX_FILES: usize = 3;

/// Placed between the texts of consecutive files
pub const FILE_SEPARATOR: &str = "\n\n---\n\n";

/// A file as uploaded by the user: name, declared type and raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declared as `application/pdf`, or named `*.pdf` when no type was given
    pub fn is_pdf(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.eq_ignore_ascii_case("application/pdf"),
            None => self.filename.to_ascii_lowercase().ends_with(".pdf"),
        }
    }
}

/// Turns one document's bytes into plain text
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> anyhow::Result<String>;
}

/// Text extractor backed by pdf-extract
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> anyhow::Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .context("failed to extract text from PDF bytes")
    }
}

/// Extraction handler: validates the batch, fans out, joins in input order
#[derive(Clone)]
pub struct DocumentExtractor {
    extractor: Arc<dyn TextExtractor>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfTextExtractor))
    }
}

impl DocumentExtractor {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn extract(&self, files: Vec<UploadedFile>) -> Result<ExtractResponse, ExtractError> {
        if files.is_empty() {
            return Err(ExtractError::NoFiles);
        }
        if files.len() > MAX_FILES {
            tracing::warn!(received = files.len(), max = MAX_FILES, "Rejecting upload batch");
            return Err(ExtractError::TooManyFiles);
        }

        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();

        let tasks = files.into_iter().map(|file| {
            let extractor = Arc::clone(&self.extractor);
            async move {
                let UploadedFile { filename, bytes, .. } = file;
                let size = bytes.len();
                let joined = tokio::task::spawn_blocking(move || extractor.extract_text(&bytes)).await;

                match joined {
                    Ok(Ok(text)) => {
                        tracing::debug!(%filename, size, chars = text.chars().count(), "Extracted text");
                        Ok(text)
                    }
                    Ok(Err(e)) => Err(ExtractError::ExtractionFailed {
                        filename,
                        cause: format!("{:#}", e),
                    }),
                    Err(join_err) => Err(ExtractError::ExtractionFailed {
                        filename,
                        cause: if join_err.is_panic() {
                            "parser panicked on malformed content".to_string()
                        } else {
                            join_err.to_string()
                        },
                    }),
                }
            }
        });

        let texts = try_join_all(tasks).await.inspect_err(|e| {
            tracing::error!(error = %e, "Error parsing PDF");
        })?;

        Ok(ExtractResponse {
            text: texts.join(FILE_SEPARATOR),
            files: filenames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Utf8Extractor;

    impl TextExtractor for Utf8Extractor {
        fn extract_text(&self, bytes: &[u8]) -> anyhow::Result<String> {
            let text = std::str::from_utf8(bytes)?;
            if text.starts_with("corrupt") {
                anyhow::bail!("invalid xref table");
            }
            Ok(text.to_string())
        }
    }

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract_text(&self, _bytes: &[u8]) -> anyhow::Result<String> {
            panic!("unexpected object stream");
        }
    }

    fn extractor() -> DocumentExtractor {
        DocumentExtractor::new(Arc::new(Utf8Extractor))
    }

    fn file(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_file_count_bounds() {
        assert!(matches!(extractor().extract(vec![]).await, Err(ExtractError::NoFiles)));

        for n in 1..=MAX_FILES {
            let files = (0..n).map(|i| file(&format!("{i}.pdf"), "x")).collect();
            assert!(extractor().extract(files).await.is_ok(), "n = {n}");
        }

        let files = (0..4).map(|i| file(&format!("{i}.pdf"), "x")).collect();
        assert!(matches!(
            extractor().extract(files).await,
            Err(ExtractError::TooManyFiles)
        ));
    }

    #[tokio::test]
    async fn test_joins_in_input_order() {
        let out = extractor()
            .extract(vec![file("b.pdf", "second"), file("a.pdf", "first"), file("c.pdf", "third")])
            .await
            .unwrap();

        assert_eq!(out.text, "second\n\n---\n\nfirst\n\n---\n\nthird");
        assert_eq!(out.files, vec!["b.pdf", "a.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_single_failure_fails_batch() {
        let err = extractor()
            .extract(vec![file("ok.pdf", "fine"), file("bad.pdf", "corrupt data")])
            .await
            .unwrap_err();

        match err {
            ExtractError::ExtractionFailed { filename, cause } => {
                assert_eq!(filename, "bad.pdf");
                assert!(cause.contains("invalid xref table"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parser_panic_is_contained() {
        let err = DocumentExtractor::new(Arc::new(PanickingExtractor))
            .extract(vec![file("a.pdf", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn test_extraction_is_deterministic() {
        let files = vec![file("a.pdf", "alpha"), file("b.pdf", "beta")];
        let first = extractor().extract(files.clone()).await.unwrap();
        let second = extractor().extract(files).await.unwrap();
        assert_eq!(first.text.as_bytes(), second.text.as_bytes());
    }

    #[tokio::test]
    async fn test_pdf_extractor_rejects_garbage() {
        let err = DocumentExtractor::default()
            .extract(vec![file("notes.pdf", "this is not a pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_is_pdf() {
        assert!(UploadedFile::new("a.PDF", vec![]).is_pdf());
        assert!(!UploadedFile::new("a.txt", vec![]).is_pdf());
        assert!(UploadedFile::new("scan", vec![])
            .with_content_type("application/pdf")
            .is_pdf());
        assert!(!UploadedFile::new("a.pdf", vec![])
            .with_content_type("text/plain")
            .is_pdf());
    }
}
