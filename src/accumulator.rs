//! Folding streamed chunks back into one reply.

use crate::response::{CompletionResponse, DEFAULT_ROLE};
use crate::types::{Message, Role};

/// Accumulates streamed chunks into a complete reply.
///
/// Feed it from the `on_chunk` callback:
///
/// ```no_run
/// # use platformed_completions::{Client, StreamAccumulator, Message};
/// # use tokio_util::sync::CancellationToken;
/// # async fn run(client: Client) -> Result<(), platformed_completions::Error> {
/// let mut reply = StreamAccumulator::new();
/// client
///     .do_stream(&[Message::user("Hi")], &CancellationToken::new(), |chunk| reply.push(chunk))
///     .await?;
/// println!("{}", reply.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct StreamAccumulator {
    text: String,
    role: Option<Role>,
    can_continue: bool,
    total_tokens: u32,
    chunks: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk into the reply.
    pub fn push(&mut self, chunk: &dyn CompletionResponse) {
        self.text.push_str(chunk.text());

        // Only the first chat delta names the speaker.
        if self.role.is_none() && chunk.role() != DEFAULT_ROLE {
            self.role = Role::parse(chunk.role());
        }

        self.can_continue = chunk.can_continue();
        self.total_tokens = self.total_tokens.max(chunk.total_tokens());
        self.chunks += 1;
    }

    /// Text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::Assistant)
    }

    /// Whether the last chunk reported the token cap.
    pub fn can_continue(&self) -> bool {
        self.can_continue
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// The reply as a message, ready to append to the conversation.
    pub fn into_message(self) -> Message {
        Message::new(self.role(), self.text)
    }
}
