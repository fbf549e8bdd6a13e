//! Client-side session: the uploaded files, their combined text, the
//! conversation and the current summary.
//!
//! [`Session`] is a plain state object whose methods are the transitions;
//! none of them perform I/O. [`SessionController`] drives those transitions
//! against a [`Backend`] and owns the async side.
//!
//! Every extraction issued by the session carries a sequence number. Only the
//! response to the most recently issued extraction is applied; anything older
//! is dropped on arrival, so the displayed text always belongs to the
//! current file set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::extract::{DocumentExtractor, UploadedFile, MAX_FILES};
use crate::inference::DocumentAssistant;
use crate::wire::{
    ErrorBody, ExtractResponse, QueryRequest, QueryResponse, SummarizeRequest, SummarizeResponse,
};

pub const DEFAULT_LENGTH: i64 = 5;
pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub color: String,
}

/// Why a submission was refused without contacting the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Blocked {
    #[error("Please upload a PDF and enter a question.")]
    QueryIncomplete,

    #[error("Please upload a PDF first.")]
    NoDocument,

    #[error("A request is already in progress.")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Blocked(#[from] Blocked),

    #[error("{0}")]
    Request(ErrorBody),
}

/// Extraction the session wants performed for sequence number `seq`
#[derive(Debug, Clone)]
pub struct ExtractionTicket {
    pub seq: u64,
    pub files: Vec<UploadedFile>,
}

/// What happened to an extraction response when it reached the session
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Latest request; the text was stored
    Applied,
    /// Latest request, but extraction failed; the previous settled state was restored
    Failed(ErrorBody),
    /// A newer request was issued after this one; the response was dropped
    Superseded,
}

#[derive(Debug, Clone)]
pub struct Session {
    files: Vec<UploadedFile>,
    extracted_text: String,
    /// File set that produced `extracted_text`
    settled_files: Vec<UploadedFile>,
    conversation: Vec<ConversationEntry>,
    summary: Option<SummaryResult>,
    question: String,
    length: i64,
    color: String,
    last_issued: u64,
    uploading: bool,
    loading: bool,
    notice: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            extracted_text: String::new(),
            settled_files: Vec::new(),
            conversation: Vec::new(),
            summary: None,
            question: String::new(),
            length: DEFAULT_LENGTH,
            color: DEFAULT_COLOR.to_string(),
            last_issued: 0,
            uploading: false,
            loading: false,
            notice: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.filename.as_str()).collect()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    pub fn summary(&self) -> Option<&SummaryResult> {
        self.summary.as_ref()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub fn set_length(&mut self, length: i64) {
        self.length = length;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    fn issue_extraction(&mut self) -> ExtractionTicket {
        self.last_issued += 1;
        self.uploading = true;
        ExtractionTicket {
            seq: self.last_issued,
            files: self.files.clone(),
        }
    }

    /// Append PDFs from `incoming`, keeping at most [`MAX_FILES`].
    ///
    /// Non-PDF files are ignored and overflow is dropped silently. Returns
    /// `None` when nothing acceptable was offered.
    pub fn add_files(&mut self, incoming: Vec<UploadedFile>) -> Option<ExtractionTicket> {
        let pdfs: Vec<UploadedFile> = incoming.into_iter().filter(UploadedFile::is_pdf).collect();
        if pdfs.is_empty() {
            return None;
        }

        self.files.extend(pdfs);
        self.files.truncate(MAX_FILES);
        Some(self.issue_extraction())
    }

    /// Remove the file at `index` and re-extract what is left.
    ///
    /// Removing the last file resets the text and the summary directly; the
    /// sequence number still advances so a late response cannot resurrect
    /// the old text. The conversation is kept either way.
    pub fn remove_file(&mut self, index: usize) -> Option<ExtractionTicket> {
        if index >= self.files.len() {
            return None;
        }
        self.files.remove(index);

        if self.files.is_empty() {
            self.last_issued += 1;
            self.uploading = false;
            self.extracted_text.clear();
            self.settled_files.clear();
            self.summary = None;
            return None;
        }
        Some(self.issue_extraction())
    }

    pub fn apply_extraction(
        &mut self,
        seq: u64,
        result: Result<ExtractResponse, ErrorBody>,
    ) -> ExtractionOutcome {
        if seq != self.last_issued {
            tracing::debug!(seq, latest = self.last_issued, "Dropping superseded extraction");
            return ExtractionOutcome::Superseded;
        }
        self.uploading = false;

        match result {
            Ok(response) => {
                self.extracted_text = response.text;
                self.settled_files = self.files.clone();
                ExtractionOutcome::Applied
            }
            Err(err) => {
                // Roll the file list back so it matches the text still on display
                self.files = self.settled_files.clone();
                self.notice = Some(format!("Error parsing PDF: {}", err.display_message()));
                ExtractionOutcome::Failed(err)
            }
        }
    }

    /// Take the drafted question for sending. The draft is cleared.
    pub fn submit_question(&mut self) -> Result<QueryRequest, Blocked> {
        if self.loading {
            return Err(Blocked::Busy);
        }
        if self.extracted_text.trim().is_empty() || self.question.trim().is_empty() {
            self.notice = Some(Blocked::QueryIncomplete.to_string());
            return Err(Blocked::QueryIncomplete);
        }

        self.loading = true;
        Ok(QueryRequest {
            text: self.extracted_text.clone(),
            question: std::mem::take(&mut self.question),
        })
    }

    /// Record the answer for `question`. Failures leave the conversation alone.
    pub fn apply_answer(
        &mut self,
        question: String,
        result: Result<QueryResponse, ErrorBody>,
    ) -> Result<ConversationEntry, ErrorBody> {
        self.loading = false;
        match result {
            Ok(response) => {
                let entry = ConversationEntry {
                    question,
                    answer: response.answer,
                };
                self.conversation.push(entry.clone());
                Ok(entry)
            }
            Err(err) => {
                self.notice = Some(err.display_message());
                Err(err)
            }
        }
    }

    pub fn request_summary(&mut self) -> Result<SummarizeRequest, Blocked> {
        if self.loading {
            return Err(Blocked::Busy);
        }
        if self.extracted_text.trim().is_empty() {
            self.notice = Some(Blocked::NoDocument.to_string());
            return Err(Blocked::NoDocument);
        }

        self.loading = true;
        Ok(SummarizeRequest::new(
            self.extracted_text.clone(),
            self.length,
            self.color.clone(),
        ))
    }

    /// Replace the summary on success; keep the last good one on failure
    pub fn apply_summary(
        &mut self,
        requested_color: String,
        result: Result<SummarizeResponse, ErrorBody>,
    ) -> Result<SummaryResult, ErrorBody> {
        self.loading = false;
        match result {
            Ok(response) => {
                let summary = SummaryResult {
                    summary: response.summary,
                    color: response.color.unwrap_or(requested_color),
                };
                self.summary = Some(summary.clone());
                Ok(summary)
            }
            Err(err) => {
                self.notice = Some(err.display_message());
                Err(err)
            }
        }
    }
}

/// The three calls a session makes
#[async_trait]
pub trait Backend: Send + Sync {
    async fn extract(&self, files: Vec<UploadedFile>) -> Result<ExtractResponse, ErrorBody>;

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, ErrorBody>;

    async fn summarize(&self, request: SummarizeRequest) -> Result<SummarizeResponse, ErrorBody>;
}

/// In-process backend: calls the handlers directly
#[derive(Clone)]
pub struct Pipeline {
    pub extractor: DocumentExtractor,
    pub assistant: DocumentAssistant,
}

impl Pipeline {
    pub fn new(extractor: DocumentExtractor, assistant: DocumentAssistant) -> Self {
        Self {
            extractor,
            assistant,
        }
    }
}

#[async_trait]
impl Backend for Pipeline {
    async fn extract(&self, files: Vec<UploadedFile>) -> Result<ExtractResponse, ErrorBody> {
        self.extractor.extract(files).await.map_err(ErrorBody::from)
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, ErrorBody> {
        self.assistant.query(request).await.map_err(ErrorBody::from)
    }

    async fn summarize(&self, request: SummarizeRequest) -> Result<SummarizeResponse, ErrorBody> {
        self.assistant.summarize(request).await.map_err(ErrorBody::from)
    }
}

/// An extraction in flight. Settles exactly once; the session is updated
/// by the background task whether or not anyone awaits this handle.
pub struct PendingExtraction {
    seq: u64,
    handle: JoinHandle<ExtractionOutcome>,
}

impl PendingExtraction {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn settle(self) -> ExtractionOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(seq = self.seq, error = %e, "Extraction task aborted");
                ExtractionOutcome::Failed(ErrorBody::new("Failed to parse PDF"))
            }
        }
    }
}

/// Drives a [`Session`] against a [`Backend`]
pub struct SessionController<B: Backend + 'static> {
    session: Arc<Mutex<Session>>,
    backend: Arc<B>,
}

impl<B: Backend + 'static> Clone for SessionController<B> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend + 'static> SessionController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            backend: Arc::new(backend),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn take_notice(&self) -> Option<String> {
        self.session.lock().await.take_notice()
    }

    pub async fn set_length(&self, length: i64) {
        self.session.lock().await.set_length(length);
    }

    pub async fn set_color(&self, color: impl Into<String>) {
        self.session.lock().await.set_color(color);
    }

    pub async fn add_files(&self, files: Vec<UploadedFile>) -> Option<PendingExtraction> {
        let ticket = self.session.lock().await.add_files(files)?;
        Some(self.dispatch(ticket))
    }

    pub async fn remove_file(&self, index: usize) -> Option<PendingExtraction> {
        let ticket = self.session.lock().await.remove_file(index)?;
        Some(self.dispatch(ticket))
    }

    fn dispatch(&self, ticket: ExtractionTicket) -> PendingExtraction {
        let ExtractionTicket { seq, files } = ticket;
        let session = Arc::clone(&self.session);
        let backend = Arc::clone(&self.backend);

        tracing::debug!(seq, files = files.len(), "Dispatching extraction");
        let handle = tokio::spawn(async move {
            let result = backend.extract(files).await;
            session.lock().await.apply_extraction(seq, result)
        });

        PendingExtraction { seq, handle }
    }

    pub async fn ask(&self, question: impl Into<String>) -> Result<ConversationEntry, SessionError> {
        let request = {
            let mut session = self.session.lock().await;
            session.set_question(question);
            session.submit_question()?
        };
        let question = request.question.clone();

        let result = self.backend.query(request).await;
        self.session
            .lock()
            .await
            .apply_answer(question, result)
            .map_err(SessionError::Request)
    }

    pub async fn summarize(&self) -> Result<SummaryResult, SessionError> {
        let request = self.session.lock().await.request_summary()?;
        let color = request.color.clone().unwrap_or_default();

        let result = self.backend.summarize(request).await;
        self.session
            .lock()
            .await
            .apply_summary(color, result)
            .map_err(SessionError::Request)
    }
}
