// Framework bootstrap for the game server runtime.

use crate::frameworks::config::{self, ServerSettings};
use crate::interface_adapters::net::{event_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{GameEvent, GameSession, ServerEvent};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Serves until Ctrl-C.
pub async fn run(listener: tokio::net::TcpListener, settings: ServerSettings) -> Result<()> {
    serve(listener, settings, shutdown_signal()).await
}

/// Serves until `shutdown` resolves, then stops the world task.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    settings: ServerSettings,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    check_settings(&settings)?;
    let address = listener.local_addr()?;

    // input_tx/rx: joins, leaves and moves all go to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    // events_tx: domain events out of the world task.
    let (events_tx, events_rx) = broadcast::channel::<ServerEvent>(config::EVENT_BROADCAST_CAPACITY);
    // event_bytes_tx: the same events serialized once, shared across all clients.
    let (event_bytes_tx, _event_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::EVENT_BROADCAST_CAPACITY);

    tokio::spawn(event_serializer(events_rx, event_bytes_tx.clone()));

    let session = GameSession::new(settings.session, StdRng::from_os_rng());
    let world_shutdown = Arc::new(Notify::new());
    let world = tokio::spawn(world_task(
        session,
        input_rx,
        events_tx,
        settings.session.tick_interval,
        world_shutdown.clone(),
    ));

    let app = router(Arc::new(AppState {
        input_tx,
        event_bytes_tx,
    }));

    tracing::info!(
        %address,
        players = settings.session.capacity,
        teams = settings.session.tuning.num_teams,
        tick_ms = settings.session.tick_interval.as_millis() as u64,
        "listening"
    );

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    world_shutdown.notify_one();
    if let Err(e) = world.await {
        tracing::error!(error = %e, "world task failed");
    }
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = ServerSettings::from_env();
    check_settings(&settings)?;
    let address = settings.addr();

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, settings).await
}

fn check_settings(settings: &ServerSettings) -> Result<()> {
    settings.validate().map_err(|e| {
        tracing::error!(error = ?e, "invalid settings");
        std::io::Error::other(format!("invalid settings: {e:?}"))
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            // Without a signal handler, keep serving until the process is killed.
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
