use super::message::{Message, Role};
use crate::response::CompletionResponse;
use std::ops::Deref;

/// An ordered message history that can be handed to the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation starting with a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new().with_system(content)
    }

    /// Create a conversation starting with a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new().with_user(content)
    }

    pub fn with_system(self, content: impl Into<String>) -> Self {
        self.with_message(Message::system(content))
    }

    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_message(Message::user(content))
    }

    pub fn with_assistant(self, content: impl Into<String>) -> Self {
        self.with_message(Message::assistant(content))
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Append a reply, keeping the role it reported.
    ///
    /// Used to re-issue a request when `can_continue()` says the previous
    /// reply was cut off by the token cap.
    pub fn with_response(self, response: &dyn CompletionResponse) -> Self {
        let role = Role::parse(response.role()).unwrap_or(Role::Assistant);
        self.with_message(Message::new(role, response.text()))
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl Deref for Conversation {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.messages
    }
}

impl From<&str> for Conversation {
    fn from(s: &str) -> Self {
        Conversation::user(s)
    }
}

impl From<String> for Conversation {
    fn from(s: String) -> Self {
        Conversation::user(s)
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Conversation { messages }
    }
}
