use crate::config::ClientConfig;
use crate::http::{ChunkHandler, HttpClient};
use crate::provider::CompletionEndpoints;
use crate::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionRequest, Engine, Error,
    TextCompletionResponse,
};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// The OpenAI implementation of both endpoint families.
#[derive(Debug, Clone)]
pub struct OpenAIEndpoints {
    http: HttpClient,
}

impl OpenAIEndpoints {
    /// Create endpoints for the OpenAI API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::from_config(&ClientConfig::new(api_key))
    }

    /// Create endpoints for an OpenAI-compatible API at `base_url`.
    pub fn new_with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::from_config(&ClientConfig::new(api_key).with_base_url(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// The underlying transport.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn completions_path(engine: &Engine) -> String {
        format!("/engines/{engine}/completions")
    }
}

#[async_trait::async_trait]
impl CompletionEndpoints for OpenAIEndpoints {
    #[tracing::instrument(skip_all, fields(model = %request.model), err)]
    async fn chat_completion(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, Error> {
        request.stream = false;
        let req = self
            .http
            .new_request(Method::POST, CHAT_COMPLETIONS_PATH, &request)?;
        let response = self.http.perform_request(req).await?;
        HttpClient::decode_body(response).await
    }

    #[tracing::instrument(skip_all, fields(model = %request.model))]
    async fn chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<(), Error> {
        request.stream = true;
        let req = self
            .http
            .new_request(Method::POST, CHAT_COMPLETIONS_PATH, &request)?;
        debug!(messages = request.messages.len(), "opening chat stream");
        self.http
            .send_and_on_data(req, &mut ChatCompletionResponse::default(), cancel, on_chunk)
            .await
    }

    #[tracing::instrument(skip_all, fields(engine = %engine), err)]
    async fn completion(
        &self,
        engine: &Engine,
        mut request: CompletionRequest,
    ) -> Result<TextCompletionResponse, Error> {
        request.stream = false;
        let req = self
            .http
            .new_request(Method::POST, &Self::completions_path(engine), &request)?;
        let response = self.http.perform_request(req).await?;
        HttpClient::decode_body(response).await
    }

    #[tracing::instrument(skip_all, fields(engine = %engine))]
    async fn completion_stream(
        &self,
        engine: &Engine,
        mut request: CompletionRequest,
        cancel: &CancellationToken,
        on_chunk: &mut ChunkHandler<'_>,
    ) -> Result<(), Error> {
        request.stream = true;
        let req = self
            .http
            .new_request(Method::POST, &Self::completions_path(engine), &request)?;
        debug!(fragments = request.prompt.len(), "opening completion stream");
        self.http
            .send_and_on_data(req, &mut TextCompletionResponse::default(), cancel, on_chunk)
            .await
    }
}
