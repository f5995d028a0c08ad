//! Axum WebSocket handler
//!
//! This module contains the WebSocket upgrade handler and the per-connection
//! loop. Each connection registers a session on accept, processes one inbound
//! frame at a time, and unregisters on disconnect.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::core::session::{ConnectionId, Session};
use crate::state::AppState;

use super::{
    messages::{IncomingMessage, OutgoingMessage},
    processor::process_chat_message,
};

/// Buffer size for the outgoing message channel
const CHANNEL_BUFFER_SIZE: usize = 64;

/// WebSocket chat handler
/// Upgrades the HTTP connection to WebSocket for the conversation relay
pub async fn ws_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("WebSocket chat connection upgrade requested");
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state))
}

/// Handle one WebSocket chat connection for its whole lifetime
async fn handle_chat_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = ConnectionId::next();

    let session = match app_state.sessions.register(connection_id) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to register {}: {}", connection_id, e);
            return;
        }
    };
    info!("WebSocket chat connection established: {}", connection_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    let (message_tx, mut message_rx) = mpsc::channel::<OutgoingMessage>(CHANNEL_BUFFER_SIZE);

    // Spawn task to handle outgoing messages so the receive loop never waits
    // on a slow client
    let sender_task = tokio::spawn(async move {
        while let Some(message) = message_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json_str) => {
                    if let Err(e) = sender.send(Message::Text(json_str.into())).await {
                        error!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize outgoing message: {}", e);
                }
            }
        }
    });

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(msg) => {
                let continue_processing =
                    process_frame(msg, &session, &message_tx, &app_state, connection_id).await;
                if !continue_processing {
                    break;
                }
            }
            Err(e) => {
                warn!("WebSocket error on {}: {}", connection_id, e);
                break;
            }
        }
    }

    // One unregister per connection lifecycle; a failure here is a lifecycle bug
    if let Err(e) = app_state.sessions.unregister(connection_id) {
        error!("Failed to unregister {}: {}", connection_id, e);
    }
    sender_task.abort();

    info!("WebSocket chat connection terminated: {}", connection_id);
}

/// Process one WebSocket frame
///
/// Returns false when the connection should close.
async fn process_frame(
    msg: Message,
    session: &Arc<Session>,
    message_tx: &mpsc::Sender<OutgoingMessage>,
    app_state: &Arc<AppState>,
    connection_id: ConnectionId,
) -> bool {
    match msg {
        Message::Text(text) => {
            debug!(
                "Received text frame on {}: {} bytes",
                connection_id,
                text.len()
            );

            // A malformed frame gets an error reply and the connection stays
            // open for the next message
            let incoming: IncomingMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Malformed frame on {}: {}", connection_id, e);
                    let _ = message_tx
                        .send(OutgoingMessage::Error {
                            error: format!("Invalid message format: {e}"),
                        })
                        .await;
                    return true;
                }
            };

            let reply = process_chat_message(incoming, session, app_state).await;
            if message_tx.send(reply).await.is_err() {
                // Sender task is gone; nothing more can be delivered
                return false;
            }
            true
        }
        Message::Binary(data) => {
            debug!(
                "Ignoring binary frame on {}: {} bytes",
                connection_id,
                data.len()
            );
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            // Ping/Pong is handled automatically by axum
            true
        }
        Message::Close(_) => {
            info!("WebSocket connection closed by client: {}", connection_id);
            false
        }
    }
}
