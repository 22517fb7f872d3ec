use crate::http::ChunkHandler;
use crate::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionRequest, Engine, Error,
    TextCompletionResponse,
};
use tokio_util::sync::CancellationToken;

/// Blocking and streaming calls against both endpoint families.
///
/// Implementations own the `stream` flag of every request: blocking calls send
/// it as false, streaming calls as true, whatever the caller passed in.
/// Streaming calls invoke `on_chunk` once per frame, in arrival order, on the
/// calling task, and return `Ok(())` only on a clean end of stream.
#[async_trait::async_trait]
pub trait CompletionEndpoints: Send + Sync {
    /// One blocking `chat/completions` call.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, Error>;

    /// One streaming `chat/completions` call.
    async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<(), Error>;

    /// One blocking legacy completion call against `engine`.
    async fn completion(
        &self,
        engine: &Engine,
        request: CompletionRequest,
    ) -> Result<TextCompletionResponse, Error>;

    /// One streaming legacy completion call against `engine`.
    async fn completion_stream(
        &self,
        engine: &Engine,
        request: CompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<(), Error>;
}
