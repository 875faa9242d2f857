//! WebSocket fan-out of ranking snapshots.
//!
//! Each connected client gets its own broadcast receiver; a slow client only
//! skips its own snapshots and never holds up publication to others.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use pointboard_shared::protocol::RankingsSnapshot;

use crate::api::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.leaderboard.updates().subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(mut socket: WebSocket, mut rx: broadcast::Receiver<RankingsSnapshot>) {
    tracing::debug!("rankings observer connected");

    loop {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Ok(snapshot) => {
                        let text = match snapshot.to_event_json() {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!(error = %e, "failed to serialize rankings snapshot");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            // Client went away; delivery is best-effort.
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "observer lagged, skipping to newer snapshots");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    // Inbound frames are ignored; axum answers pings itself.
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    tracing::debug!("rankings observer disconnected");
}
