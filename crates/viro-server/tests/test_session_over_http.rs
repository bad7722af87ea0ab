//! Drives a session controller through the endpoint client against a
//! locally bound server.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use viro_core::error::{Result, ViroError};
use viro_core::generation::GenerationBackend;
use viro_core::history::InMemoryHistoryRepository;
use viro_core::identity::UserIdentity;
use viro_core::session::SessionController;
use viro_interaction::GenerateEndpointClient;
use viro_server::{AppState, build_router};

struct QueueBackend {
    replies: Mutex<VecDeque<Result<String>>>,
}

#[async_trait]
impl GenerationBackend for QueueBackend {
    async fn generate(&self, _topic: &str) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ViroError::generation("exhausted")))
    }
}

async fn spawn_server(replies: Vec<Result<String>>) -> String {
    let backend = Arc::new(QueueBackend {
        replies: Mutex::new(replies.into()),
    });
    let app = build_router(AppState::new(backend));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_submit_through_endpoint_records_history() {
    let endpoint = spawn_server(vec![
        Ok("1. ... 2. ...".to_string()),
        Err(ViroError::generation("Cohere no disponible")),
    ])
    .await;
    let repo = Arc::new(InMemoryHistoryRepository::new());
    let controller =
        SessionController::new(repo.clone(), Arc::new(GenerateEndpointClient::new(endpoint)));
    controller
        .on_identity_change(Some(UserIdentity::new("u1", "Ana")))
        .await
        .unwrap();

    let text = controller.submit("reels de cocina").await.unwrap();
    assert_eq!(text, "1. ... 2. ...");

    let err = controller.submit("reels de cocina").await.unwrap_err();
    assert!(err.is_generation());

    let state = controller.snapshot().await;
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history.entries()[0].topic(), "reels de cocina");
    assert_eq!(state.history.entries()[0].result(), "1. ... 2. ...");
    assert_eq!(state.last_error.as_deref(), Some("Cohere no disponible"));
    assert!(repo.contains("u1"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_generation_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = GenerateEndpointClient::new(format!("http://{addr}"));
    let err = client.generate("gatos").await.unwrap_err();

    assert!(err.is_generation());
}
