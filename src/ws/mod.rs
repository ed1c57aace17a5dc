pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::SplitSink, stream::StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// Countdown resolution
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send a batch of messages. Returns false once the socket is gone.
async fn send_all(sender: &mut SplitSink<WebSocket, Message>, messages: Vec<ServerMessage>) -> bool {
    for msg in messages {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    return false;
                }
            }
            Err(e) => tracing::error!("Failed to serialize message: {}", e),
        }
    }
    true
}

/// One connection is one player. The countdown ticks only while it is open.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let player_id = state.create_player().await;
    tracing::info!("WebSocket connected: player {}", player_id);

    let welcome = ServerMessage::Welcome {
        player_id: player_id.clone(),
        themes: state.bank.themes().into_iter().map(String::from).collect(),
    };
    if !send_all(&mut sender, vec![welcome]).await {
        tracing::error!("Failed to send welcome message");
        state.remove_player(&player_id).await;
        return;
    }

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let messages = handlers::handle_tick(&state, &player_id, Instant::now()).await;
                if !send_all(&mut sender, messages).await {
                    break;
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        let responses = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handlers::handle_message(client_msg, &player_id, &state).await
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                vec![ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                }]
                            }
                        };
                        if !send_all(&mut sender, responses).await {
                            tracing::error!("Failed to send response");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.remove_player(&player_id).await;
    tracing::info!("WebSocket connection closed for player {}", player_id);
}
