use async_trait::async_trait;
use docqa_core::{
    Backend, Blocked, DocumentAssistant, DocumentExtractor, ErrorBody, ExtractResponse,
    ExtractionOutcome, InferenceSettings, Pipeline, QueryRequest, QueryResponse, SessionController,
    SessionError, SummarizeRequest, SummarizeResponse, TextExtractor, UploadedFile,
};
use docqa_llm::{ChatClient, ChatRequest, ChatResponse};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Treats file bytes as UTF-8 text
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> anyhow::Result<String> {
        let text = std::str::from_utf8(bytes)?;
        if text.contains("%corrupt") {
            anyhow::bail!("invalid cross-reference table");
        }
        Ok(text.to_string())
    }
}

/// Replays a fixed answer and records prompts
#[derive(Default)]
struct ScriptedChat {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        let prompt = request.messages.last().map(|m| m.text().to_string()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        Ok(ChatResponse::text(self.reply.clone()))
    }
}

fn pipeline(chat: Arc<ScriptedChat>) -> Pipeline {
    Pipeline::new(
        DocumentExtractor::new(Arc::new(PlainTextExtractor)),
        DocumentAssistant::new(chat, InferenceSettings::new("test-model", true)),
    )
}

fn pdf(name: &str, body: &str) -> UploadedFile {
    UploadedFile::new(name, body.as_bytes().to_vec()).with_content_type("application/pdf")
}

#[tokio::test]
async fn test_scenario_question_answer() {
    let chat = Arc::new(ScriptedChat {
        reply: "It says hello world.".into(),
        ..Default::default()
    });
    let controller = SessionController::new(pipeline(chat.clone()));

    let pending = controller.add_files(vec![pdf("hello.pdf", "Hello world")]).await.unwrap();
    assert_eq!(pending.settle().await, ExtractionOutcome::Applied);

    let entry = controller.ask("What does the text say?").await.unwrap();
    assert_eq!(entry.answer, "It says hello world.");

    let state = controller.snapshot().await;
    assert_eq!(state.extracted_text(), "Hello world");
    assert_eq!(state.conversation().len(), 1);
    assert!(chat.prompts.lock().unwrap()[0].ends_with("PDF Text:\nHello world"));
}

#[tokio::test]
async fn test_scenario_summary_with_color() {
    let chat = Arc::new(ScriptedChat {
        reply: "Brief.".into(),
        ..Default::default()
    });
    let controller = SessionController::new(pipeline(chat.clone()));

    controller
        .add_files(vec![pdf("lorem.pdf", "Lorem ipsum...")])
        .await
        .unwrap()
        .settle()
        .await;
    controller.set_length(1).await;
    controller.set_color("#ff0000").await;

    let summary = controller.summarize().await.unwrap();
    assert_eq!(summary.summary, "Brief.");
    assert_eq!(summary.color, "#ff0000");
    assert!(chat.prompts.lock().unwrap()[0].contains("very brief (1-2 sentences)"));
}

#[tokio::test]
async fn test_removal_reextracts_remaining_files() {
    let controller = SessionController::new(pipeline(Arc::new(ScriptedChat::default())));

    controller
        .add_files(vec![pdf("a.pdf", "alpha"), pdf("b.pdf", "beta"), pdf("c.pdf", "gamma")])
        .await
        .unwrap()
        .settle()
        .await;
    assert_eq!(
        controller.snapshot().await.extracted_text(),
        "alpha\n\n---\n\nbeta\n\n---\n\ngamma"
    );

    let outcome = controller.remove_file(1).await.unwrap().settle().await;
    assert_eq!(outcome, ExtractionOutcome::Applied);
    assert_eq!(controller.snapshot().await.extracted_text(), "alpha\n\n---\n\ngamma");
}

#[tokio::test]
async fn test_blocked_submissions_make_no_calls() {
    let chat = Arc::new(ScriptedChat::default());
    let controller = SessionController::new(pipeline(chat.clone()));

    assert_eq!(
        controller.ask("anything?").await.unwrap_err(),
        SessionError::Blocked(Blocked::QueryIncomplete)
    );
    assert_eq!(
        controller.summarize().await.unwrap_err(),
        SessionError::Blocked(Blocked::NoDocument)
    );
    assert!(chat.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_upload_keeps_previous_state() {
    let controller = SessionController::new(pipeline(Arc::new(ScriptedChat::default())));

    controller.add_files(vec![pdf("a.pdf", "alpha")]).await.unwrap().settle().await;
    let outcome = controller
        .add_files(vec![pdf("b.pdf", "%corrupt")])
        .await
        .unwrap()
        .settle()
        .await;

    assert!(matches!(outcome, ExtractionOutcome::Failed(_)));
    let state = controller.snapshot().await;
    assert_eq!(state.filenames(), vec!["a.pdf"]);
    assert_eq!(state.extracted_text(), "alpha");
    assert!(controller.take_notice().await.unwrap().contains("invalid cross-reference table"));
}

/// Holds single-file extractions until released, answers the rest at once
struct GatedBackend {
    gate: Notify,
    extractions: AtomicUsize,
}

#[async_trait]
impl Backend for GatedBackend {
    async fn extract(&self, files: Vec<UploadedFile>) -> Result<ExtractResponse, ErrorBody> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        if files.len() == 1 {
            self.gate.notified().await;
        }
        let names: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
        Ok(ExtractResponse {
            text: names.join(" + "),
            files: names,
        })
    }

    async fn query(&self, _request: QueryRequest) -> Result<QueryResponse, ErrorBody> {
        Err(ErrorBody::new("unused"))
    }

    async fn summarize(&self, _request: SummarizeRequest) -> Result<SummarizeResponse, ErrorBody> {
        Err(ErrorBody::new("unused"))
    }
}

#[tokio::test]
async fn test_late_response_does_not_overwrite_newer_one() {
    let controller = SessionController::new(GatedBackend {
        gate: Notify::new(),
        extractions: AtomicUsize::new(0),
    });

    let slow = controller.add_files(vec![pdf("a.pdf", "")]).await.unwrap();
    let fast = controller.add_files(vec![pdf("b.pdf", "")]).await.unwrap();
    assert!(fast.seq() > slow.seq());

    assert_eq!(fast.settle().await, ExtractionOutcome::Applied);
    assert_eq!(controller.snapshot().await.extracted_text(), "a.pdf + b.pdf");

    controller.backend().gate.notify_one();
    assert_eq!(slow.settle().await, ExtractionOutcome::Superseded);

    let state = controller.snapshot().await;
    assert_eq!(state.extracted_text(), "a.pdf + b.pdf");
    assert!(!state.is_uploading());
    assert_eq!(controller.backend().extractions.load(Ordering::SeqCst), 2);
}
