use crate::{Engine, Error};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the client and its HTTP transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent as the `OpenAI-Organization` header when set.
    pub organization: Option<String>,
    /// Engine used by the dispatcher; also decides the endpoint family.
    pub engine: Engine,
    /// Generation cap applied to every dispatched request.
    pub max_tokens: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            engine: Engine::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("platformed-completions/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_engine(mut self, engine: impl Into<Engine>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create configuration from environment variables.
    ///
    /// `OPENAI_API_KEY` is required. `OPENAI_BASE_URL`, `OPENAI_ORGANIZATION`,
    /// `OPENAI_ENGINE`, `OPENAI_MAX_TOKENS` and `OPENAI_TIMEOUT_SECS` override
    /// the defaults.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| Error::config("OPENAI_API_KEY environment variable is required"))?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(organization) = env::var("OPENAI_ORGANIZATION") {
            config.organization = Some(organization);
        }
        if let Ok(engine) = env::var("OPENAI_ENGINE") {
            config.engine = Engine::new(engine);
        }
        if let Ok(max_tokens) = env::var("OPENAI_MAX_TOKENS") {
            config.max_tokens = max_tokens.parse().map_err(|_| {
                Error::config(format!("OPENAI_MAX_TOKENS must be a positive integer, got '{max_tokens}'"))
            })?;
        }
        if let Ok(timeout) = env::var("OPENAI_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| {
                Error::config(format!("OPENAI_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configuration that cannot produce a working client.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("API key must not be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base URL must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than zero"));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
