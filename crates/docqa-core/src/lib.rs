//! Core pipeline for docqa: extract text from uploaded PDFs, then answer
//! questions about it or summarize it through a chat model.
//!
//! Server handlers live in `docqa-api`; everything here is transport-free so
//! the same code backs the HTTP routes and the in-process session driver.

pub mod error;
pub mod wire;
pub mod extract;
pub mod templates;
pub mod inference;
pub mod session;

pub use error::{ExtractError, InferenceError};
pub use wire::{
    ErrorBody, ExtractResponse, QueryRequest, QueryResponse, SummarizeRequest,
    SummarizeResponse,
};
pub use extract::{DocumentExtractor, PdfTextExtractor, TextExtractor, UploadedFile};
pub use templates::LengthLevel;
pub use inference::{DocumentAssistant, InferenceSettings};
pub use session::{
    Backend, Blocked, ConversationEntry, ExtractionOutcome, PendingExtraction, Pipeline,
    Session, SessionController, SessionError, SummaryResult,
};
