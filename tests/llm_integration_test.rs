//! Integration test for LLM client connectivity.

use game_master::{
    CompletionBackend, CredentialStore, Generator, LlmClient, LlmConfig, LlmProvider,
};
use tracing::instrument;

async fn connectivity(provider: LlmProvider) {
    dotenvy::dotenv().ok();

    let credentials = CredentialStore::from_env(provider);
    assert!(credentials.is_set(), "{} not set", provider.api_key_var());

    let config = LlmConfig::new(provider, provider.default_model().to_string(), 100);
    let client = LlmClient::new(config, credentials);

    let response = client
        .complete_json(r#"Reply with {"greeting": "Hello, world!"}"#)
        .await
        .expect("Failed to generate");

    let value: serde_json::Value =
        serde_json::from_str(&response).expect("Response should be JSON");
    assert!(value.is_object(), "Response should be a JSON object");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_connectivity() {
    connectivity(LlmProvider::Gemini).await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    connectivity(LlmProvider::OpenAI).await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    connectivity(LlmProvider::Anthropic).await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_generates_quiz() {
    dotenvy::dotenv().ok();

    let provider = LlmProvider::Gemini;
    let config = LlmConfig::new(provider, provider.default_model().to_string(), 16_384);
    let client = LlmClient::new(config, CredentialStore::from_env(provider));

    let game = Generator::new(client)
        .generate("Trái Đất quay quanh Mặt Trời. Một năm có 365 ngày. Mặt Trăng quay quanh Trái Đất.")
        .await
        .expect("Failed to generate game");

    assert!(!game.title().is_empty());
    assert!(!game.items().is_empty());
    eprintln!("{}", serde_json::to_string_pretty(&game).expect("serialize"));
}

#[tokio::test]
async fn test_missing_key_is_a_credential_failure() {
    let provider = LlmProvider::Anthropic;
    let config = LlmConfig::new(provider, provider.default_model().to_string(), 100);
    let client = LlmClient::new(config, CredentialStore::new(None));

    let err = Generator::new(client)
        .generate("Bài học")
        .await
        .expect_err("missing key must fail");
    assert!(err.is_credential_failure());
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}
