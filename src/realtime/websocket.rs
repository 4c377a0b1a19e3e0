//! Websocket endpoint for product change delivery.
//!
//! Each accepted connection is a long-lived, independent subscriber with
//! its own receiver; one connection stalling or disconnecting never
//! affects another.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::AppState;

/// `GET /websocket` - upgrade and stream product change events until the
/// client goes away.
pub async fn product_socket(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    let mut events = state.events.subscribe();
    let (mut sink, mut stream) = socket.split();

    info!("websocket subscriber {connection_id} connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(err) => {
                            warn!("failed to encode product event: {err}");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("websocket subscriber {connection_id} lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Inbound frames carry no protocol; ignore them.
                Some(Ok(_)) => {}
            },
        }
    }

    info!("websocket subscriber {connection_id} disconnected");
}
