//! Prompt templates, source truncation and the summary length table

use docqa_llm::Message;
use serde_json::Value;
use std::borrow::Cow;

/// Longest source text forwarded to the model, in characters
pub const MAX_SOURCE_CHARS: usize = 200_000;

pub const TRUNCATION_NOTICE: &str = "\n\n[Truncated for model input due to size limits.]";

pub const QUERY_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the provided PDF text. Be concise and accurate in your responses.";

pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates clear and concise summaries of PDF documents.";

const LENGTH_DESCRIPTORS: [&str; 10] = [
    "very brief (1-2 sentences)",
    "brief (2-3 sentences)",
    "short (3-4 sentences)",
    "concise (4-5 sentences)",
    "moderate (5-7 sentences)",
    "detailed (7-9 sentences)",
    "comprehensive (9-12 sentences)",
    "thorough (12-15 sentences)",
    "extensive (15-20 sentences)",
    "very extensive (20+ sentences)",
];

/// Summary length on a 1..=10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthLevel(u8);

impl LengthLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: LengthLevel = LengthLevel(5);

    /// Levels outside 1..=10 resolve to the default
    pub fn new(level: i64) -> Self {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&level) {
            Self(level as u8)
        } else {
            Self::DEFAULT
        }
    }

    /// Lenient reading of a JSON `length` field.
    ///
    /// Integers, integral floats and numeric strings are honored; anything
    /// else (null, absent, fractional, text) gives the default.
    pub fn from_json(value: Option<&Value>) -> Self {
        let level = match value {
            Some(Value::Number(n)) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        level.map(Self::new).unwrap_or(Self::DEFAULT)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn descriptor(self) -> &'static str {
        LENGTH_DESCRIPTORS[(self.0 - 1) as usize]
    }
}

impl Default for LengthLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Cut `text` to [`MAX_SOURCE_CHARS`] characters and append the notice.
/// Text within the limit is borrowed unchanged.
pub fn truncate_source(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_SOURCE_CHARS) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_NOTICE.len());
            out.push_str(&text[..cut]);
            out.push_str(TRUNCATION_NOTICE);
            Cow::Owned(out)
        }
    }
}

pub fn query_messages(question: &str, source: &str) -> Vec<Message> {
    vec![
        Message::system(QUERY_SYSTEM_PROMPT),
        Message::human(format!(
            "Based on the following PDF text, please answer this question: {}\n\nPDF Text:\n{}",
            question,
            truncate_source(source)
        )),
    ]
}

pub fn summary_messages(level: LengthLevel, source: &str) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_SYSTEM_PROMPT),
        Message::human(format!(
            "Please provide a {} summary of the following PDF text:\n\n{}",
            level.descriptor(),
            truncate_source(source)
        )),
    ]
}
