use jollof_llm::{
    ChatClient, ChatOptions, ChatRequest, EmbeddingClient, EmbeddingRequest, Message,
    OpenAIClient, OpenAIConfig,
};
use mockito::Matcher;

fn client_for(server: &mockito::Server) -> OpenAIClient {
    OpenAIClient::from_config(OpenAIConfig::new("test-key").with_base_url(server.url())).unwrap()
}

#[tokio::test]
async fn it_sends_chat_completion_and_parses_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": "List steps." },
                { "role": "user", "content": "How to make Jollof Rice" }
            ]
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "1. Heat oil 2. Add rice" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let request = ChatRequest::new(
        "gpt-4o-mini",
        vec![Message::system("List steps."), Message::human("How to make Jollof Rice")],
    )
    .with_options(ChatOptions::new().temperature(0.2));

    let response = client.chat(request).await.unwrap();

    assert_eq!(response.content.as_deref(), Some("1. Heat oil 2. Add rice"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 20);
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_on_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client
        .chat(ChatRequest::new("gpt-4o-mini", vec![Message::human("hi")]))
        .await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("500"));
    assert!(err.contains("upstream exploded"));
    mock.assert_async().await;
}

#[tokio::test]
async fn it_returns_embeddings_in_input_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "text-embedding-3-small",
            "input": ["rice", "beans"]
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ],
                "usage": { "prompt_tokens": 2, "total_tokens": 2 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .embed(EmbeddingRequest::batch(
            "text-embedding-3-small",
            vec!["rice".to_string(), "beans".to_string()],
        ))
        .await
        .unwrap();

    assert_eq!(response.embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(response.usage.unwrap().output_tokens, 0);
    mock.assert_async().await;
}
