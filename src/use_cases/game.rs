use super::session::{GameSession, TickOutcome};
use super::types::{GameEvent, ServerEvent};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Owns the session and serializes every mutation: inbound events are applied
/// as they arrive, ticks fire on a fixed period, and neither overlaps the other.
pub async fn world_task(
    mut session: GameSession,
    mut input_rx: mpsc::Receiver<GameEvent>,
    events_tx: broadcast::Sender<ServerEvent>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("world task shutting down");
                break;
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    warn!("input channel closed; world task exiting");
                    break;
                };
                handle_event(&mut session, event, &events_tx);
            }
            _ = interval.tick() => {
                if let Some(outcome) = run_guarded_tick(|| session.tick()) {
                    publish_tick(outcome, &events_tx);
                }
            }
        }
    }
}

fn handle_event(
    session: &mut GameSession,
    event: GameEvent,
    events_tx: &broadcast::Sender<ServerEvent>,
) {
    match event {
        GameEvent::Join { reply } => match session.join() {
            Ok(accepted) => {
                let player_id = accepted.player_id;
                if accepted.started {
                    let _ = events_tx.send(ServerEvent::Start { your_id: player_id });
                    let _ = events_tx.send(ServerEvent::State(session.snapshot()));
                }
                if reply.send(Ok(player_id)).is_err() {
                    // Connection went away while waiting; free the slot again.
                    debug!(player_id, "join reply dropped");
                    session.leave(player_id);
                }
            }
            Err(e) => {
                info!(error = ?e, "join refused");
                let _ = reply.send(Err(e));
            }
        },
        GameEvent::Leave { player_id } => session.leave(player_id),
        GameEvent::Move {
            player_id,
            frog_id,
            dir,
        } => match session.apply_move(player_id, frog_id, dir) {
            Ok(outcome) => debug!(player_id, frog_id, ?dir, ?outcome, "move applied"),
            Err(reason) => debug!(player_id, frog_id, ?dir, ?reason, "move dropped"),
        },
    }
}

/// Runs one tick, turning a panic into `None` so the scheduler keeps going.
fn run_guarded_tick(tick: impl FnOnce() -> TickOutcome) -> Option<TickOutcome> {
    match catch_unwind(AssertUnwindSafe(tick)) {
        Ok(outcome) => Some(outcome),
        Err(_) => {
            error!("tick panicked; continuing");
            None
        }
    }
}

fn publish_tick(outcome: TickOutcome, events_tx: &broadcast::Sender<ServerEvent>) {
    // Send errors only mean nobody is subscribed right now.
    match outcome {
        TickOutcome::Idle => {}
        TickOutcome::State(snapshot) => {
            let _ = events_tx.send(ServerEvent::State(snapshot));
        }
        TickOutcome::Ended { winner } => {
            let _ = events_tx.send(ServerEvent::End { winner });
        }
    }
}
