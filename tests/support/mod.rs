// Shared helpers for driving a real server over WebSocket in integration tests.
#![allow(dead_code)]

use frog_server::ServerSettings;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Upper bound for any single expected message.
pub const WAIT: Duration = Duration::from_secs(3);

pub struct TestServer {
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    // Stop serving and wait for the world task to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = timeout(WAIT, &mut self.handle).await;
    }
}

// Reference settings bound to loopback; tests tweak what they need.
pub fn settings() -> ServerSettings {
    let mut settings = ServerSettings::default();
    settings.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
    settings
}

// Every test gets its own server: a process only ever runs one game.
pub async fn start_server(settings: ServerSettings) -> TestServer {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind((settings.host, 0))
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(frog_server::serve(listener, settings, async move {
        let _ = shutdown_rx.await;
    }));

    TestServer {
        url: format!("ws://{addr}/ws"),
        shutdown: Some(shutdown_tx),
        handle,
    }
}

pub async fn connect(url: &str) -> Client {
    let (client, _response) = timeout(WAIT, connect_async(url))
        .await
        .expect("connect in time")
        .expect("websocket handshake");
    client
}

// Next frame that is not a ping/pong; `None` once the stream ends.
pub async fn next_frame(client: &mut Client) -> Option<Message> {
    loop {
        let frame = timeout(WAIT, client.next()).await.expect("frame in time")?;
        match frame {
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(msg) => return Some(msg),
            Err(_) => return None,
        }
    }
}

pub async fn next_json(client: &mut Client) -> Value {
    match next_frame(client).await {
        Some(Message::Text(text)) => serde_json::from_str(text.as_str()).expect("valid json"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

// Skips messages until one with the given `type` arrives.
pub async fn next_of_type(client: &mut Client, ty: &str) -> Value {
    loop {
        let msg = next_json(client).await;
        if msg["type"] == ty {
            return msg;
        }
    }
}

// True if nothing but pings arrives within `window`.
pub async fn stays_quiet(client: &mut Client, window: Duration) -> bool {
    loop {
        match timeout(window, client.next()).await {
            Err(_) => return true,
            Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => continue,
            Ok(_) => return false,
        }
    }
}

pub async fn send_text(client: &mut Client, text: &str) {
    client
        .send(Message::Text(text.to_string().into()))
        .await
        .expect("send text frame");
}

pub async fn send_move(client: &mut Client, frog_id: i64, dir: &str) {
    let msg = serde_json::json!({ "type": "move", "frogId": frog_id, "dir": dir });
    send_text(client, &msg.to_string()).await;
}

// Connects two clients and consumes their welcome messages.
pub async fn fill_lobby(url: &str) -> (Client, Client) {
    let mut a = connect(url).await;
    assert_eq!(next_json(&mut a).await["type"], "welcome");
    let mut b = connect(url).await;
    assert_eq!(next_json(&mut b).await["type"], "welcome");
    (a, b)
}
