//! Response shapes for both endpoint families and the read contract they share.

use serde::{Deserialize, Serialize};

/// Role reported when a response does not carry one.
pub const DEFAULT_ROLE: &str = "assistant";

/// Finish reason meaning generation stopped at the token cap.
pub const FINISH_REASON_LENGTH: &str = "length";

/// The read contract shared by every response shape.
///
/// No accessor fails: an empty or absent response answers `""`,
/// `"assistant"`, `false` and `0`.
pub trait CompletionResponse: Send + Sync {
    /// Content of the first choice, or `""`.
    fn text(&self) -> &str;

    /// Role of the first choice, or `"assistant"`.
    fn role(&self) -> &str;

    /// True iff the first choice stopped because it hit the token cap.
    fn can_continue(&self) -> bool;

    /// Aggregate token usage, or `0`.
    fn total_tokens(&self) -> u32;

    /// Restore the zero value in place.
    fn reset(&mut self);
}

/// An absent response behaves like an empty one.
impl<T: CompletionResponse> CompletionResponse for Option<T> {
    fn text(&self) -> &str {
        self.as_ref().map_or("", |r| r.text())
    }

    fn role(&self) -> &str {
        self.as_ref().map_or(DEFAULT_ROLE, |r| r.role())
    }

    fn can_continue(&self) -> bool {
        self.as_ref().is_some_and(|r| r.can_continue())
    }

    fn total_tokens(&self) -> u32 {
        self.as_ref().map_or(0, |r| r.total_tokens())
    }

    fn reset(&mut self) {
        if let Some(r) = self {
            r.reset();
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

fn is_length(finish_reason: Option<&str>) -> bool {
    finish_reason == Some(FINISH_REASON_LENGTH)
}

/// Role and content fragment emitted by a chat choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One choice of a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    /// Streaming bodies key this `delta`; blocking bodies key it `message`.
    #[serde(rename = "delta", alias = "message", default)]
    pub message: ChatChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response (or stream chunk) from the `chat/completions` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResponse for ChatCompletionResponse {
    fn text(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("")
    }

    fn role(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.role.as_deref())
            .filter(|role| !role.is_empty())
            .unwrap_or(DEFAULT_ROLE)
    }

    fn can_continue(&self) -> bool {
        is_length(self.choices.first().and_then(|c| c.finish_reason.as_deref()))
    }

    fn total_tokens(&self) -> u32 {
        self.usage.as_ref().map_or(0, |u| u.total_tokens)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One choice of a legacy completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChoice {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response (or stream chunk) from the legacy completion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<TextChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResponse for TextCompletionResponse {
    fn text(&self) -> &str {
        self.choices.first().map_or("", |c| c.text.as_str())
    }

    // Legacy completions carry no speaker.
    fn role(&self) -> &str {
        DEFAULT_ROLE
    }

    fn can_continue(&self) -> bool {
        is_length(self.choices.first().and_then(|c| c.finish_reason.as_deref()))
    }

    fn total_tokens(&self) -> u32 {
        self.usage.as_ref().map_or(0, |u| u.total_tokens)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A blocking response from whichever endpoint family served the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Chat(ChatCompletionResponse),
    Text(TextCompletionResponse),
}

impl Completion {
    fn inner(&self) -> &dyn CompletionResponse {
        match self {
            Completion::Chat(r) => r,
            Completion::Text(r) => r,
        }
    }

    pub fn is_chat(&self) -> bool {
        matches!(self, Completion::Chat(_))
    }
}

impl CompletionResponse for Completion {
    fn text(&self) -> &str {
        self.inner().text()
    }

    fn role(&self) -> &str {
        self.inner().role()
    }

    fn can_continue(&self) -> bool {
        self.inner().can_continue()
    }

    fn total_tokens(&self) -> u32 {
        self.inner().total_tokens()
    }

    fn reset(&mut self) {
        match self {
            Completion::Chat(r) => r.reset(),
            Completion::Text(r) => r.reset(),
        }
    }
}

impl From<ChatCompletionResponse> for Completion {
    fn from(response: ChatCompletionResponse) -> Self {
        Completion::Chat(response)
    }
}

impl From<TextCompletionResponse> for Completion {
    fn from(response: TextCompletionResponse) -> Self {
        Completion::Text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_empty(response: &dyn CompletionResponse) {
        assert_eq!(response.text(), "");
        assert_eq!(response.role(), "assistant");
        assert!(!response.can_continue());
        assert_eq!(response.total_tokens(), 0);
    }

    fn chat_chunk(json: &str) -> ChatCompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_zero_values_answer_defaults() {
        assert_empty(&ChatCompletionResponse::default());
        assert_empty(&TextCompletionResponse::default());
        assert_empty(&Completion::Chat(ChatCompletionResponse::default()));
        assert_empty(&Completion::Text(TextCompletionResponse::default()));
    }

    #[test]
    fn test_absent_response_answers_defaults() {
        let mut absent: Option<ChatCompletionResponse> = None;
        assert_empty(&absent);
        absent.reset();
        assert_empty(&absent);

        let absent: Option<TextCompletionResponse> = None;
        assert_empty(&absent);
    }

    #[test]
    fn test_chat_accessors() {
        let response = chat_chunk(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hi there"}, "finish_reason": "stop"},
                    {"index": 1, "message": {"role": "assistant", "content": "Other"}, "finish_reason": "length"}
                ],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            }"#,
        );

        assert_eq!(response.text(), "Hi there");
        assert_eq!(response.role(), "assistant");
        assert!(!response.can_continue());
        assert_eq!(response.total_tokens(), 7);
    }

    #[test]
    fn test_delta_chunk_without_role_defaults_to_assistant() {
        let response = chat_chunk(
            r#"{"object":"chat.completion.chunk","choices":[{"delta":{"content":"块"},"index":0,"finish_reason":null}]}"#,
        );

        assert_eq!(response.text(), "块");
        assert_eq!(response.role(), "assistant");
        assert_eq!(response.total_tokens(), 0);

        let response = chat_chunk(r#"{"choices":[{"delta":{"role":""},"index":0}]}"#);
        assert_eq!(response.role(), "assistant");

        let response = chat_chunk(r#"{"choices":[{"delta":{"role":"system"},"index":0}]}"#);
        assert_eq!(response.role(), "system");
    }

    #[test]
    fn test_can_continue_only_on_length() {
        for (reason, expected) in [
            (r#""length""#, true),
            (r#""stop""#, false),
            (r#""content_filter""#, false),
            (r#""""#, false),
            ("null", false),
        ] {
            let json = format!(
                r#"{{"choices":[{{"delta":{{"content":"x"}},"finish_reason":{reason}}}]}}"#
            );
            assert_eq!(chat_chunk(&json).can_continue(), expected, "reason {reason}");

            let json = format!(r#"{{"choices":[{{"text":"x","finish_reason":{reason}}}]}}"#);
            let text: TextCompletionResponse = serde_json::from_str(&json).unwrap();
            assert_eq!(text.can_continue(), expected, "reason {reason}");
        }

        assert!(!chat_chunk(r#"{"choices":[{"delta":{"content":"x"}}]}"#).can_continue());
    }

    #[test]
    fn test_null_usage_and_content_decode() {
        let response = chat_chunk(
            r#"{"choices":[{"delta":{"content":null},"finish_reason":"length"}],"usage":null}"#,
        );
        assert_eq!(response.text(), "");
        assert!(response.can_continue());
        assert_eq!(response.total_tokens(), 0);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut chat = chat_chunk(
            r#"{"choices":[{"delta":{"role":"user","content":"x"},"finish_reason":"length"}],"usage":{"total_tokens":9}}"#,
        );
        chat.reset();
        assert_eq!(chat, ChatCompletionResponse::default());
        assert_empty(&chat);

        let mut text: TextCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"text":"y","finish_reason":"length"}],"usage":{"total_tokens":3}}"#,
        )
        .unwrap();
        text.reset();
        assert_eq!(text, TextCompletionResponse::default());
        assert_empty(&text);

        let mut some = Some(chat_chunk(r#"{"choices":[{"delta":{"content":"z"}}]}"#));
        some.reset();
        assert_empty(&some);
    }

    #[test]
    fn test_text_completion_accessors() {
        let response: TextCompletionResponse = serde_json::from_str(
            r#"{
                "id": "cmpl-1",
                "object": "text_completion",
                "model": "text-davinci-003",
                "choices": [{"text": "\n\nThis is a test", "index": 0, "logprobs": null, "finish_reason": "length"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
            }"#,
        )
        .unwrap();

        let completion = Completion::from(response);
        assert!(!completion.is_chat());
        assert_eq!(completion.text(), "\n\nThis is a test");
        assert_eq!(completion.role(), "assistant");
        assert!(completion.can_continue());
        assert_eq!(completion.total_tokens(), 12);
    }

    #[test]
    fn test_chat_choice_serializes_as_delta() {
        let response = chat_chunk(r#"{"choices":[{"message":{"content":"x"}}]}"#);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["choices"][0]["delta"]["content"], "x");
    }
}
