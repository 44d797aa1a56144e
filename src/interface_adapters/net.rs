use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, LobbyError, PlayerId, ServerEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures for the teardown log.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    JoinReplyDropped,
    EventsClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const LOBBY_FULL_MESSAGE: &str = "Lobby full";

/// Process-unique id used to correlate logs for one socket.
fn next_conn_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

pub async fn event_serializer(
    mut events_rx: broadcast::Receiver<ServerEvent>,
    event_bytes_tx: broadcast::Sender<Utf8Bytes>,
) {
    // Serialize each event once and broadcast the shared bytes.
    loop {
        match events_rx.recv().await {
            Ok(event) => {
                let msg = ServerMessage::from(event);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize server event");
                        continue;
                    }
                };
                // No subscribers just means nobody is connected.
                let _ = event_bytes_tx.send(Utf8Bytes::from(txt));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "event serializer lagged; skipping ahead");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("server events channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = next_conn_id();
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, state).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match bootstrap_connection(&mut socket, &state).await {
        Ok(Some(ctx)) => ctx,
        Ok(None) => {
            info!("lobby full; connection refused");
            let _ = reject_connection(&mut socket).await;
            return;
        }
        Err(e) => {
            error!(error = ?e, "could not admit player");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id);
    info!(player_id = ctx.player_id, "player connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "player connection ended with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

async fn reject_connection(socket: &mut WebSocket) -> Result<(), NetError> {
    let msg = ServerMessage::Error {
        message: LOBBY_FULL_MESSAGE.to_string(),
    };
    send_message(socket, &msg).await?;
    socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::AGAIN,
            reason: "lobby full".into(),
        })))
        .await?;
    socket.close().await.map_err(NetError::Ws)
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub event_bytes_rx: broadcast::Receiver<Utf8Bytes>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub dropped_in: u64,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,
    pub last_lag_log: Instant,
}

/// Asks the world task for a slot. `Ok(None)` means the lobby is full.
async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
) -> Result<Option<ConnCtx>, NetError> {
    // Subscribe before joining so the start event this join may trigger is not missed.
    let event_bytes_rx = state.event_bytes_tx.subscribe();

    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .input_tx
        .send(GameEvent::Join { reply: reply_tx })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let player_id = match reply_rx.await.map_err(|_| NetError::JoinReplyDropped)? {
        Ok(player_id) => player_id,
        Err(LobbyError::Full) => return Ok(None),
    };

    // Tell the client "This is who you are" before any broadcast traffic.
    if let Err(e) = send_message(socket, &ServerMessage::Welcome { your_id: player_id }).await {
        let _ = state.input_tx.send(GameEvent::Leave { player_id }).await;
        return Err(e);
    }

    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    Ok(Some(ConnCtx {
        player_id,
        input_tx: state.input_tx.clone(),
        event_bytes_rx,

        msgs_in: 0,
        msgs_out: 1,
        dropped_in: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,
        last_lag_log: now,
    }))
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Frame from the player
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Game event for the player
            event = ctx.event_bytes_rx.recv() => {
                match event {
                    Ok(bytes) => match socket.send(Message::Text(bytes)).await {
                        Ok(()) => {
                            ctx.msgs_out += 1;
                            false
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to send server event");
                            true
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Slow clients simply miss events.
                        if should_log(&mut ctx.last_lag_log) {
                            warn!(missed = n, "server events lagged");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "close handshake failed");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "could not release player slot");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                handle_client_text(text.as_str(), ctx)
            }
            Message::Binary(_) => {
                ctx.dropped_in += 1;
                debug!(player_id, "binary message ignored");
                Ok(LoopControl::Continue)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "player socket error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "player socket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

// Invalid input is dropped without telling the client.
fn handle_client_text(text: &str, ctx: &mut ConnCtx) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let (frog_id, dir) = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Move { frog_id, dir }) => (frog_id, dir.into()),
        Ok(ClientMessage::Other) => {
            ctx.dropped_in += 1;
            debug!(player_id, "unrecognized message type ignored");
            return Ok(LoopControl::Continue);
        }
        Err(e) => {
            ctx.dropped_in += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(
                    player_id,
                    bytes = text.len(),
                    error = %e,
                    "unreadable player message"
                );
            }
            return Ok(LoopControl::Continue);
        }
    };

    match ctx.input_tx.try_send(GameEvent::Move {
        player_id,
        frog_id,
        dir,
    }) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            ctx.dropped_in += 1;
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id, "input channel full; dropping move");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    ctx.input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        dropped_in = ctx.dropped_in,
        "player connection stats"
    );
    info!(player_id, "player disconnected");
    Ok(())
}
