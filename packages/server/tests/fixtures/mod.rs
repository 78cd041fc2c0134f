//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{ServerConfig, ui};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Gateway running in-process on an ephemeral port
pub struct TestServer {
    addr: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let state = ui::build_state(&config)
            .await
            .expect("Failed to build server state");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address").to_string();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            ui::serve(listener, state, shutdown)
                .await
                .expect("Server failed");
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect");
        ws
    }

    /// Connect and consume the initial history frame
    pub async fn connect_and_skip_history(&self) -> WsClient {
        let mut ws = self.connect().await;
        let history = recv_json(&mut ws).await;
        assert_eq!(history["type"], "history");
        ws
    }

    /// Connect and complete the naming step, consuming the frames it produces
    pub async fn join(&self, name: &str) -> WsClient {
        let mut ws = self.connect_and_skip_history().await;
        send_json(&mut ws, json!({"type": "set_name", "name": name})).await;
        wait_for(&mut ws, |v| v["type"] == "users").await;
        ws
    }

    /// Poll the participants endpoint until the registry holds `count` entries
    pub async fn wait_for_participants(&self, count: u64) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            let body: Value = client
                .get(format!("{}/api/participants", self.base_url()))
                .send()
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse JSON");
            if body["count"] == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("registry never reached {} participants", count);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

pub async fn send_raw(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, skipping control frames
pub async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

/// Receive frames until one matches `predicate`
pub async fn wait_for(ws: &mut WsClient, predicate: impl Fn(&Value) -> bool) -> Value {
    loop {
        let value = recv_json(ws).await;
        if predicate(&value) {
            return value;
        }
    }
}

/// Assert that nothing arrives within a short window
pub async fn assert_silent(ws: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}
