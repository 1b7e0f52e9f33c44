use mockito::{Matcher, Server, ServerGuard};
use openai_embedded::models::{
    AudioInputFormat, AudioResponseFormat, Capabilities, Capability, Config,
};
use openai_embedded::{ApiResponse, Error, OpenAi};
use std::time::Duration;

fn client(server: &ServerGuard) -> OpenAi {
    let mut config = Config::new("test-key");
    config.base_url = Some(format!("{}/v1/", server.url()));
    config.timeout = Duration::from_secs(5);
    OpenAi::from_config(&config).unwrap()
}

#[test]
fn test_embedding_round_trip_over_http() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/embeddings")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "input": "hello",
            "model": "text-embedding-ada-002"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"embedding":[0.1,0.2]}],"usage":{"total_tokens":1}}"#)
        .create();

    let openai = client(&server);
    let response = openai
        .embedding_create("hello", "text-embedding-ada-002", None)
        .unwrap();

    mock.assert();
    assert_eq!(response.len(), 1);
    assert_eq!(response.usage(), Some(1));
    assert_eq!(response.get(0).unwrap().as_slice(), &[0.1, 0.2]);
}

#[test]
fn test_error_body_becomes_response_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/v1/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"invalid_api_key","type":"invalid_request_error"}}"#)
        .create();

    let openai = client(&server);
    let completion = openai.completion_create().unwrap();
    let response = completion.prompt("hello").unwrap();

    assert_eq!(response.len(), 0);
    assert_eq!(response.error(), Some("invalid_api_key"));
}

#[test]
fn test_server_error_without_body_is_transport_failure() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/v1/moderations")
        .with_status(502)
        .with_body("Bad Gateway")
        .create();

    let openai = client(&server);
    let err = openai.moderation_create("text", None).unwrap_err();

    assert!(err.is_transport());
}

#[test]
fn test_chat_conversation_over_http() {
    let mut server = Server::new();
    let openai = client(&server);
    let mut chat = openai.chat_create().unwrap();
    chat.set_system("Be brief.");

    let first = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}],"usage":{"total_tokens":5}}"#)
        .create();

    assert_eq!(chat.message("Hi", true).unwrap().text(0), Some("Hello!"));
    first.assert();
    first.remove();

    let second = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "Bye"}
            ]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Goodbye!"}}]}"#)
        .create();

    assert_eq!(chat.message("Bye", false).unwrap().text(0), Some("Goodbye!"));
    second.assert();
    assert_eq!(chat.conversation().len(), 3);
}

#[test]
fn test_transcription_multipart_over_http() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("filename=\"audio.webm\"".to_string()),
            Matcher::Regex("name=\"response_format\"\r\n\r\ntext\r\n".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("hello from the device\n")
        .create();

    let openai = client(&server);
    let mut transcription = openai.audio_transcription_create().unwrap();
    transcription.set_response_format(AudioResponseFormat::Text);

    let text = transcription
        .file(b"fake-webm-bytes", AudioInputFormat::Webm)
        .unwrap();

    mock.assert();
    assert_eq!(text, "hello from the device\n");
}

#[test]
fn test_validation_failure_never_reaches_server() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/v1/completions").expect(0).create();

    let openai = client(&server);
    let mut completion = openai.completion_create().unwrap();
    completion.set_best_of(2).set_n(3);

    let err = completion.prompt("hello").unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    mock.assert();
}

#[test]
fn test_capabilities_from_config() {
    let server = Server::new();
    let mut config = Config::new("test-key");
    config.base_url = Some(server.url());
    config.capabilities = Capabilities::none().with(Capability::Moderation);

    let openai = OpenAi::from_config(&config).unwrap();

    assert!(openai.moderation_create("", None).unwrap_err().is_validation());
    assert!(matches!(
        openai.chat_create(),
        Err(Error::CapabilityDisabled(Capability::ChatCompletion))
    ));
}
