//! WebSocket message dispatch
//!
//! Every client message acts on the sending player's context. Session
//! transitions answer with the event itself followed by a fresh play snapshot.

use crate::error::QuizError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionEvent;
use crate::state::AppState;
use crate::types::{Lifeline, PlayerId};
use std::sync::Arc;
use std::time::Instant;

/// Render an error for the acting player
pub fn error_message(err: QuizError) -> ServerMessage {
    match &err {
        QuizError::Storage(e) => tracing::error!("Storage failure: {}", e),
        other => tracing::debug!("Rejected action: {}", other),
    }
    ServerMessage::Error {
        code: err.code().to_string(),
        msg: err.to_string(),
    }
}

/// Turn a session event into messages, followed by the play snapshot
async fn session_update(
    state: &Arc<AppState>,
    player_id: &PlayerId,
    event: SessionEvent,
) -> Vec<ServerMessage> {
    let mut out: Vec<ServerMessage> = ServerMessage::from_event(event).into_iter().collect();
    let already_ended = out.iter().any(ServerMessage::ends_run);

    match state.snapshot(player_id).await {
        Ok(Some(snap)) => {
            if let Some(question) = snap.question {
                out.push(ServerMessage::Question {
                    question,
                    lifelines: snap.lifelines,
                    phase: snap.phase,
                });
            }
            if snap.is_over && !already_ended {
                out.push(ServerMessage::GameOver {
                    final_score: snap.score,
                });
            }
        }
        Ok(None) => {}
        Err(e) => out.push(error_message(e)),
    }
    out
}

async fn lobby_update(state: &Arc<AppState>, player_id: &PlayerId) -> Vec<ServerMessage> {
    match state.lobby(player_id).await {
        Ok(lobby) => vec![ServerMessage::Lobby { lobby }],
        Err(e) => vec![error_message(e)],
    }
}

async fn lifeline(state: &Arc<AppState>, player_id: &PlayerId, which: Lifeline) -> Vec<ServerMessage> {
    match state.use_lifeline(player_id, which).await {
        Ok(event) => session_update(state, player_id, event).await,
        Err(e) => vec![error_message(e)],
    }
}

/// Advance the countdown of one player. Plain ticks are sent alone, a timeout
/// is followed by the final snapshot.
pub async fn handle_tick(state: &Arc<AppState>, player_id: &PlayerId, now: Instant) -> Vec<ServerMessage> {
    match state.tick(player_id, now).await {
        Ok(Some(event @ SessionEvent::TimedOut { .. })) => {
            tracing::info!("Player {} ran out of time", player_id);
            session_update(state, player_id, event).await
        }
        Ok(Some(event)) => ServerMessage::from_event(event).into_iter().collect(),
        Ok(None) => Vec::new(),
        Err(e) => vec![error_message(e)],
    }
}

/// Handle a client message and return the responses for the sender
pub async fn handle_message(
    msg: ClientMessage,
    player_id: &PlayerId,
    state: &Arc<AppState>,
) -> Vec<ServerMessage> {
    match msg {
        // Lobby
        ClientMessage::SelectTheme { theme } => match state.select_theme(player_id, &theme).await {
            Ok(lobby) => vec![ServerMessage::Lobby { lobby }],
            Err(e) => vec![error_message(e)],
        },

        ClientMessage::Register { nickname, pin } => {
            match state.register(player_id, &nickname, &pin).await {
                Ok(lobby) => vec![ServerMessage::Lobby { lobby }],
                Err(e) => vec![error_message(e)],
            }
        }

        ClientMessage::SkipRegistration => match state.skip_registration(player_id).await {
            Ok(lobby) => vec![ServerMessage::Lobby { lobby }],
            Err(e) => vec![error_message(e)],
        },

        ClientMessage::Redeem { code } => match state.redeem(player_id, &code).await {
            Ok(redemption) => {
                let mut out = vec![ServerMessage::redeemed(redemption)];
                out.extend(lobby_update(state, player_id).await);
                out
            }
            Err(e) => vec![error_message(e)],
        },

        // Play
        ClientMessage::StartRun { mode } => match state.start_run(player_id, mode).await {
            Ok(event) => session_update(state, player_id, event).await,
            Err(e) => vec![error_message(e)],
        },

        ClientMessage::SubmitAnswer { selected } => {
            match state.submit_answer(player_id, selected.as_deref()).await {
                Ok(event) => session_update(state, player_id, event).await,
                Err(e) => vec![error_message(e)],
            }
        }

        ClientMessage::UseFifty => lifeline(state, player_id, Lifeline::Fifty).await,

        ClientMessage::UseCall => lifeline(state, player_id, Lifeline::Call).await,

        ClientMessage::NextQuestion => match state.next_question(player_id).await {
            Ok(event) => session_update(state, player_id, event).await,
            Err(e) => vec![error_message(e)],
        },

        ClientMessage::PlayAgain => match state.play_again(player_id).await {
            Ok(recorded) => {
                if recorded {
                    tracing::info!("Player {} set a new best score", player_id);
                }
                lobby_update(state, player_id).await
            }
            Err(e) => vec![error_message(e)],
        },

        // Records
        ClientMessage::GetLeaderboard { theme } => {
            let theme = match theme {
                Some(theme) => theme,
                None => match state.lobby(player_id).await {
                    Ok(lobby) => match lobby.theme {
                        Some(theme) => theme,
                        None => {
                            return vec![error_message(QuizError::UnknownTheme(String::new()))]
                        }
                    },
                    Err(e) => return vec![error_message(e)],
                },
            };
            match state.leaderboard_top(&theme).await {
                Ok(entries) => vec![ServerMessage::Leaderboard { theme, entries }],
                Err(e) => vec![error_message(e.into())],
            }
        }

        ClientMessage::SubmitFeedback { message } => match state.submit_feedback(&message).await {
            Ok(()) => vec![ServerMessage::FeedbackSaved],
            Err(e) => vec![error_message(e)],
        },
    }
}
