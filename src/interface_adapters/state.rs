use crate::use_cases::GameEvent;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, mpsc};

#[derive(Clone)]
pub struct AppState {
    // Joins, leaves and moves flowing from the network into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized server events, shared across all connections.
    pub event_bytes_tx: broadcast::Sender<Utf8Bytes>,
}
