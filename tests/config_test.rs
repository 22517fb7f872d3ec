use platformed_completions::{Client, ClientConfig, Engine, Error};
use std::env;
use std::time::Duration;

const VARS: [&str; 6] = [
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_ORGANIZATION",
    "OPENAI_ENGINE",
    "OPENAI_MAX_TOKENS",
    "OPENAI_TIMEOUT_SECS",
];

fn clear() {
    for var in VARS {
        env::remove_var(var);
    }
}

// Environment variables are process wide, so every case runs in one test.
#[test]
fn config_from_environment() {
    clear();
    match ClientConfig::from_env() {
        Err(Error::Config(message)) => assert!(message.contains("OPENAI_API_KEY")),
        other => panic!("Expected config error, got {other:?}"),
    }

    env::set_var("OPENAI_API_KEY", "sk-env");
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config, ClientConfig::new("sk-env"));

    env::set_var("OPENAI_BASE_URL", "http://localhost:8080/v1/");
    env::set_var("OPENAI_ORGANIZATION", "org-env");
    env::set_var("OPENAI_ENGINE", "gpt-4");
    env::set_var("OPENAI_MAX_TOKENS", "512");
    env::set_var("OPENAI_TIMEOUT_SECS", "5");
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://localhost:8080/v1/");
    assert_eq!(config.organization.as_deref(), Some("org-env"));
    assert_eq!(config.engine, Engine::GPT_4);
    assert_eq!(config.max_tokens, 512);
    assert_eq!(config.timeout, Duration::from_secs(5));

    let client = Client::from_env().unwrap();
    assert!(client.engine().is_chat());
    assert_eq!(client.max_tokens(), 512);

    env::set_var("OPENAI_MAX_TOKENS", "lots");
    assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));

    env::set_var("OPENAI_MAX_TOKENS", "0");
    assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));

    env::set_var("OPENAI_MAX_TOKENS", "512");
    env::set_var("OPENAI_TIMEOUT_SECS", "-1");
    assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));

    clear();
}
