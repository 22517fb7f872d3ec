use serde::Deserialize;

/// OpenAI error response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIError {
    pub error: ErrorDetails,
}

/// Error details from OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    /// A string on most errors, a number on some streamed ones.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl OpenAIError {
    /// Extract the human readable message from an error body, falling back
    /// to the raw body when it is not an OpenAI error object.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<OpenAIError>(body) {
            Ok(parsed) => parsed.describe(),
            Err(_) => body.trim().to_string(),
        }
    }

    /// The error carried by a stream frame, if the frame is an error object.
    pub fn from_frame(data: &str) -> Option<OpenAIError> {
        serde_json::from_str(data).ok()
    }

    /// Message with the error type appended when the server sent one.
    pub fn describe(&self) -> String {
        match &self.error.r#type {
            Some(kind) if !kind.is_empty() => format!("{} ({kind})", self.error.message),
            _ => self.error.message.clone(),
        }
    }
}
