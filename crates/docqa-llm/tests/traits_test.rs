use docqa_llm::{ChatOptions, ChatRequest, ChatResponse, Message};

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("llama-3.3-70b-versatile", messages);

    assert_eq!(request.model, "llama-3.3-70b-versatile");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new().temperature(0.7).max_tokens(2048);
    let request = ChatRequest::new("m", vec![Message::human("Hello")]).with_options(options);

    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(2048));
}

#[test]
fn test_chat_options_default() {
    let options = ChatOptions::default();

    assert_eq!(options.temperature, None);
    assert_eq!(options.max_tokens, None);
}

#[test]
fn test_chat_response_text() {
    let response = ChatResponse::text("done");
    assert_eq!(response.content.as_deref(), Some("done"));
    assert!(response.usage.is_none());
}
