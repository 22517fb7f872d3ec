//! High level client that picks the endpoint family from the configured engine.

use crate::config::ClientConfig;
use crate::provider::CompletionEndpoints;
use crate::response::CompletionResponse;
use crate::{
    ChatCompletionRequest, Completion, CompletionRequest, Engine, Error, Message, OpenAIEndpoints,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const EMPTY_CONVERSATION: &str = "conversation must contain at least one message";

/// Sends a conversation to whichever endpoint family the engine belongs to.
///
/// Chat-capable engines receive the whole conversation. Legacy engines get a
/// flat prompt: `do_once` sends only the first message, `do_stream` sends one
/// prompt fragment per message.
#[derive(Debug, Clone)]
pub struct Client<E = OpenAIEndpoints> {
    endpoints: E,
    engine: Engine,
    max_tokens: u32,
}

impl Client<OpenAIEndpoints> {
    /// Create a client for the OpenAI API from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let endpoints = OpenAIEndpoints::from_config(&config)?;
        Ok(Self::with_endpoints(endpoints, config.engine, config.max_tokens))
    }

    /// Create a client from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<E: CompletionEndpoints> Client<E> {
    /// Create a client over any endpoint implementation.
    pub fn with_endpoints(endpoints: E, engine: Engine, max_tokens: u32) -> Self {
        Self {
            endpoints,
            engine,
            max_tokens,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn endpoints(&self) -> &E {
        &self.endpoints
    }

    /// Issue one blocking request for `messages`.
    #[tracing::instrument(skip_all, fields(engine = %self.engine, messages = messages.len()), err)]
    pub async fn do_once(&self, messages: &[Message]) -> Result<Completion, Error> {
        let first = messages.first().ok_or_else(|| Error::validation(EMPTY_CONVERSATION))?;

        if self.engine.is_chat() {
            let request = self.chat_request(messages);
            let response = self.endpoints.chat_completion(request).await?;
            return Ok(Completion::Chat(response));
        }

        let request = CompletionRequest::new([first.content.as_str()]).max_tokens(self.max_tokens);
        let response = self.endpoints.completion(&self.engine, request).await?;
        Ok(Completion::Text(response))
    }

    /// Stream a reply for `messages`, calling `on_chunk` once per frame.
    ///
    /// Returns `Ok(())` when the server closes the stream cleanly,
    /// [`Error::Cancelled`] when `cancel` fires first.
    #[tracing::instrument(skip_all, fields(engine = %self.engine, messages = messages.len()), err)]
    pub async fn do_stream<F>(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
        mut on_chunk: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&dyn CompletionResponse) + Send,
    {
        if messages.is_empty() {
            return Err(Error::validation(EMPTY_CONVERSATION));
        }

        if self.engine.is_chat() {
            let request = self.chat_request(messages);
            return self
                .endpoints
                .chat_completion_stream(request, cancel, &mut on_chunk)
                .await;
        }

        let fragments = messages.iter().map(|m| m.content.as_str());
        let request = CompletionRequest::new(fragments).max_tokens(self.max_tokens);
        debug!(fragments = request.prompt.len(), "streaming legacy completion");
        self.endpoints
            .completion_stream(&self.engine, request, cancel, &mut on_chunk)
            .await
    }

    fn chat_request(&self, messages: &[Message]) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.engine.clone(), messages.to_vec())
            .max_tokens(self.max_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_config() {
        let client = Client::new(
            ClientConfig::new("test-key")
                .with_engine(Engine::GPT_35_TURBO)
                .with_max_tokens(100),
        )
        .unwrap();

        assert_eq!(client.engine(), &Engine::GPT_35_TURBO);
        assert_eq!(client.max_tokens(), 100);
    }

    #[tokio::test]
    async fn test_empty_conversation_is_rejected() {
        let client = Client::new(ClientConfig::new("test-key")).unwrap();

        let result = client.do_once(&[]).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = client
            .do_stream(&[], &CancellationToken::new(), |_| {})
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
