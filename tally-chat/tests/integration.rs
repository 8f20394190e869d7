//! Integration tests for the chat client using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tally_chat::{ChatClient, ChatError, ChatEvent, ChatObserver, ChatRequest, DocumentRefs};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Observer that records every callback into a shared log.
#[derive(Clone, Default)]
struct Recording {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recording {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Poll until the log gains a terminal entry or the deadline passes.
    async fn wait_for_terminal(&self) {
        for _ in 0..250 {
            let done = self
                .entries()
                .iter()
                .any(|e| e == "complete" || e.starts_with("err:"));
            if done {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no terminal callback within deadline: {:?}", self.entries());
    }
}

impl ChatObserver for Recording {
    fn on_message(&mut self, raw_json: &str) {
        self.log.lock().unwrap().push(format!("msg:{raw_json}"));
    }

    fn on_error(&mut self, error: ChatError) {
        self.log.lock().unwrap().push(format!("err:{error}"));
    }

    fn on_complete(&mut self) {
        self.log.lock().unwrap().push("complete".into());
    }
}

async fn collect_frames(client: &ChatClient, request: ChatRequest) -> Vec<String> {
    let stream = client.send(request).await.expect("send should succeed");
    stream
        .receiver
        .filter_map(|event| async move {
            match event {
                ChatEvent::Frame(frame) => Some(frame),
                ChatEvent::Error(e) => panic!("unexpected stream error: {e}"),
            }
        })
        .collect()
        .await
}

#[tokio::test]
async fn send_sets_headers_and_decodes_frames() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "text/event-stream"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(&br#"{"data":"a"}{"data":"b"}"#[..], "text/event-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let frames = collect_frames(&client, ChatRequest::new("hello")).await;

    assert_eq!(frames, vec![r#"{"data":"a"}"#, r#"{"data":"b"}"#]);
}

#[tokio::test]
async fn send_applies_default_model_and_empty_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(body_json(serde_json::json!({
            "message": "hello",
            "modelId": "ledger-7b",
            "tempFileIds": [],
            "knowledgeIdFiles": [],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token")
        .base_url(mock_server.uri())
        .model("ledger-7b");
    let frames = collect_frames(&client, ChatRequest::new("hello")).await;
    assert!(frames.is_empty());
}

#[tokio::test]
async fn request_model_wins_over_client_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(body_json(serde_json::json!({
            "message": "hello",
            "modelId": "pinned",
            "tempFileIds": [],
            "knowledgeIdFiles": [],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token")
        .base_url(mock_server.uri())
        .model("ledger-7b");
    collect_frames(&client, ChatRequest::new("hello").model("pinned")).await;
}

#[tokio::test]
async fn custom_auth_header_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(header("x-tally-token", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("secret")
        .base_url(mock_server.uri())
        .auth_header("x-tally-token");
    collect_frames(&client, ChatRequest::new("hello")).await;
}

#[tokio::test]
async fn http_500_maps_to_service_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let err = client
        .send(ChatRequest::new("hello"))
        .await
        .expect_err("expected error");

    assert!(matches!(
        &err,
        ChatError::ServiceUnavailable { status: 500, body } if body == "boom"
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn http_401_maps_to_authentication() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("stale-token").base_url(mock_server.uri());
    let err = client
        .send(ChatRequest::new("hello"))
        .await
        .expect_err("expected error");

    assert!(matches!(err, ChatError::Authentication(msg) if msg == "expired"));
}

#[tokio::test]
async fn start_delivers_messages_then_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(&br#"{"data":"a"}{"data":"b"}"#[..], "text/event-stream"),
        )
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let observer = Recording::default();
    let log = observer.clone();

    client.start(ChatRequest::new("hello"), observer);
    log.wait_for_terminal().await;

    assert_eq!(
        log.entries(),
        vec![r#"msg:{"data":"a"}"#, r#"msg:{"data":"b"}"#, "complete"]
    );
}

#[tokio::test]
async fn start_reports_http_error_through_observer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let observer = Recording::default();
    let log = observer.clone();

    client.start(ChatRequest::new("hello"), observer);
    log.wait_for_terminal().await;

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("err:"), "got: {entries:?}");
}

#[tokio::test]
async fn close_suppresses_all_delivery() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_raw(&br#"{"data":"late"}"#[..], "text/event-stream"),
        )
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let observer = Recording::default();
    let log = observer.clone();

    let handle = client.start(ChatRequest::new("hello"), observer);
    handle.close();
    handle.close();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(log.entries().is_empty(), "got: {:?}", log.entries());
    assert!(handle.is_closed());
}

#[tokio::test]
async fn empty_body_completes_with_zero_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let observer = Recording::default();
    let log = observer.clone();

    client.start(ChatRequest::new("hello"), observer);
    log.wait_for_terminal().await;

    assert_eq!(log.entries(), vec!["complete"]);
}

#[tokio::test]
async fn garbage_prefix_never_reaches_the_observer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(&br#"garbage{"data":"x"}"#[..], "text/event-stream"),
        )
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let observer = Recording::default();
    let log = observer.clone();

    client.start(ChatRequest::new("hello"), observer);
    log.wait_for_terminal().await;

    assert_eq!(log.entries(), vec![r#"msg:{"data":"x"}"#, "complete"]);
}

#[tokio::test]
async fn stop_posts_request_body_with_stop_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(body_json(serde_json::json!({
            "message": "halt",
            "sessionId": "s-1",
            "tempFileIds": ["t-1"],
            "knowledgeIdFiles": [],
            "stop": true,
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let request = ChatRequest::new("halt").session("s-1").documents(DocumentRefs {
        temp_file_ids: vec!["t-1".into()],
        knowledge_id_files: vec![],
    });

    client.stop(&request).await.expect("stop should succeed");
}

#[tokio::test]
async fn history_fetches_payload_for_session() {
    let mock_server = MockServer::start().await;

    let payload = serde_json::json!([
        {"role": "user", "content": "what did we spend in March?"},
        {"role": "assistant", "content": "EUR 4,210 across 38 entries."},
    ]);

    Mock::given(method("GET"))
        .and(path("/ai/chat/history"))
        .and(query_param("sessionId", "s-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let history = client.history("s-1").await.expect("history should succeed");

    assert_eq!(history, payload);
}

#[tokio::test]
async fn history_error_status_maps_like_chat() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ai/chat/history"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown session"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new("test-token").base_url(mock_server.uri());
    let err = client.history("missing").await.expect_err("expected error");

    assert!(matches!(err, ChatError::Http { status: 404, .. }));
}
