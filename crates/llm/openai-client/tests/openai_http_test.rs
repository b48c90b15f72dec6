//! HTTP-level tests for [`openai_client::OpenAIClient`] against a local mockito server.
//!
//! Verifies the request body (model, token budget) and the failure modes:
//! non-2xx status and a response with no choices.

use mockito::Matcher;
use openai_client::{
    parse_voice, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, OpenAIClient,
};
use serde_json::json;

fn messages() -> Vec<ChatCompletionRequestMessage> {
    vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content("You are an English teacher for level A2.")
            .build()
            .unwrap()
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content("I goed to school.")
            .build()
            .unwrap()
            .into(),
    ]
}

fn completion_body(choices: serde_json::Value) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-3.5-turbo",
        "choices": choices,
        "usage": { "prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28 }
    })
    .to_string()
}

/// **Test: A 200 response yields the first choice's content; the request carries model and max_tokens.**
#[tokio::test]
async fn test_chat_completion_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test-key-123456")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 300
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": "Correction: I went to school." },
            "finish_reason": "stop",
            "logprobs": null
        }])))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("sk-test-key-123456".to_string(), server.url());
    let reply = client
        .chat_completion("gpt-3.5-turbo", messages(), Some(300))
        .await
        .expect("completion");

    assert_eq!(reply, "Correction: I went to school.");
    mock.assert_async().await;
}

/// **Test: A 401 from the API is an error for the turn.**
#[tokio::test]
async fn test_chat_completion_unauthorized_is_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("sk-wrong-key-000000".to_string(), server.url());
    let result = client
        .chat_completion("gpt-3.5-turbo", messages(), Some(300))
        .await;

    assert!(result.is_err());
    mock.assert_async().await;
}

/// **Test: A 200 response without choices is an error.**
#[tokio::test]
async fn test_chat_completion_without_choices_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(json!([])))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("sk-test-key-123456".to_string(), server.url());
    let err = client
        .chat_completion("gpt-3.5-turbo", messages(), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No response"));
}

/// **Test: Speech returns the raw audio bytes of the response.**
#[tokio::test]
async fn test_speech_returns_audio_bytes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/audio/speech")
        .match_body(Matcher::PartialJson(json!({
            "input": "Hello, learner!",
            "voice": "alloy",
            "response_format": "opus"
        })))
        .with_status(200)
        .with_header("content-type", "audio/ogg")
        .with_body(b"OggS-fake-audio".to_vec())
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("sk-test-key-123456".to_string(), server.url());
    let audio = client
        .speech(
            openai_client::parse_speech_model("tts-1"),
            parse_voice("alloy").unwrap(),
            "Hello, learner!",
        )
        .await
        .expect("speech");

    assert_eq!(audio, b"OggS-fake-audio".to_vec());
    mock.assert_async().await;
}
