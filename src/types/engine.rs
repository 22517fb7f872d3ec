use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Identifier of the model (engine) that serves a request.
///
/// The identifier also decides which endpoint family is used: chat-capable
/// engines go to `/chat/completions`, everything else to the legacy
/// `/engines/{engine}/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Engine(Cow<'static, str>);

impl Engine {
    pub const ADA: Engine = Engine::from_static("ada");
    pub const BABBAGE: Engine = Engine::from_static("babbage");
    pub const CURIE: Engine = Engine::from_static("curie");
    pub const DAVINCI: Engine = Engine::from_static("davinci");
    pub const TEXT_ADA_001: Engine = Engine::from_static("text-ada-001");
    pub const TEXT_BABBAGE_001: Engine = Engine::from_static("text-babbage-001");
    pub const TEXT_CURIE_001: Engine = Engine::from_static("text-curie-001");
    pub const TEXT_DAVINCI_002: Engine = Engine::from_static("text-davinci-002");
    pub const TEXT_DAVINCI_003: Engine = Engine::from_static("text-davinci-003");
    pub const CODE_DAVINCI_002: Engine = Engine::from_static("code-davinci-002");
    pub const GPT_35_TURBO: Engine = Engine::from_static("gpt-3.5-turbo");
    pub const GPT_35_TURBO_0301: Engine = Engine::from_static("gpt-3.5-turbo-0301");
    pub const GPT_4: Engine = Engine::from_static("gpt-4");
    pub const GPT_4_0314: Engine = Engine::from_static("gpt-4-0314");
    pub const GPT_4_32K: Engine = Engine::from_static("gpt-4-32k");
    pub const GPT_4_32K_0314: Engine = Engine::from_static("gpt-4-32k-0314");

    const CHAT_FAMILY: [&'static str; 6] = [
        "gpt-3.5-turbo",
        "gpt-3.5-turbo-0301",
        "gpt-4",
        "gpt-4-0314",
        "gpt-4-32k",
        "gpt-4-32k-0314",
    ];

    /// Create an engine from any identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Engine(Cow::Owned(name.into()))
    }

    const fn from_static(name: &'static str) -> Self {
        Engine(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this engine accepts multi-turn chat payloads.
    pub fn is_chat(&self) -> bool {
        Self::CHAT_FAMILY.iter().any(|name| *name == self.as_str())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::DAVINCI
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Engine {
    fn from(name: &str) -> Self {
        Engine::new(name)
    }
}

impl From<String> for Engine {
    fn from(name: String) -> Self {
        Engine::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_family() {
        assert!(Engine::GPT_35_TURBO.is_chat());
        assert!(Engine::GPT_35_TURBO_0301.is_chat());
        assert!(Engine::GPT_4.is_chat());
        assert!(Engine::new("gpt-4-32k").is_chat());

        assert!(!Engine::DAVINCI.is_chat());
        assert!(!Engine::TEXT_DAVINCI_003.is_chat());
        assert!(!Engine::new("my-finetune").is_chat());
    }

    #[test]
    fn test_engine_serializes_as_plain_string() {
        let value = serde_json::to_value(Engine::GPT_35_TURBO).unwrap();
        assert_eq!(value, serde_json::json!("gpt-3.5-turbo"));

        let parsed: Engine = serde_json::from_str("\"text-curie-001\"").unwrap();
        assert_eq!(parsed, Engine::TEXT_CURIE_001);
    }

    #[test]
    fn test_default_engine() {
        assert_eq!(Engine::default().as_str(), "davinci");
    }
}
