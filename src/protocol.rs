use crate::session::{Phase, QuestionView, SessionEvent};
use crate::state::LobbyView;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    SelectTheme {
        theme: ThemeName,
    },
    Register {
        nickname: String,
        pin: String,
    },
    SkipRegistration,
    Redeem {
        code: String,
    },
    StartRun {
        mode: GameMode,
    },
    SubmitAnswer {
        /// None when the player confirmed without picking an option
        selected: Option<String>,
    },
    UseFifty,
    UseCall,
    NextQuestion,
    PlayAgain,
    GetLeaderboard {
        /// Defaults to the player's current theme
        theme: Option<ThemeName>,
    },
    SubmitFeedback {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        player_id: PlayerId,
        themes: Vec<ThemeName>,
    },
    Lobby {
        lobby: LobbyView,
    },
    Question {
        question: QuestionView,
        lifelines: LifelineAvailability,
        phase: Phase,
    },
    AnswerResult {
        correct: bool,
        points: u32,
        correct_answer: String,
        /// Lifelines won back by this answer
        restored: Vec<Lifeline>,
    },
    FiftyResult {
        options: Vec<String>,
        streak_broken: bool,
    },
    FriendHint {
        hint: String,
    },
    Tick {
        seconds_left: u32,
        /// Set while the early-reveal perk is showing the answer
        revealed_answer: Option<String>,
    },
    TimedOut {
        final_score: u32,
    },
    GameOver {
        final_score: u32,
    },
    Redeemed {
        redemption: Redemption,
        message: String,
    },
    Leaderboard {
        theme: ThemeName,
        entries: Vec<LeaderboardEntry>,
    },
    FeedbackSaved,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    /// Wire form of a session event. Question changes are sent as snapshots instead.
    pub fn from_event(event: SessionEvent) -> Option<Self> {
        match event {
            SessionEvent::QuestionStarted { .. } => None,
            SessionEvent::AnswerResolved {
                correct,
                points,
                correct_answer,
                restored,
            } => Some(ServerMessage::AnswerResult {
                correct,
                points,
                correct_answer,
                restored,
            }),
            SessionEvent::FiftyUsed {
                options,
                streak_broken,
            } => Some(ServerMessage::FiftyResult {
                options,
                streak_broken,
            }),
            SessionEvent::FriendCalled { hint } => Some(ServerMessage::FriendHint { hint }),
            SessionEvent::Tick {
                seconds_left,
                revealed_answer,
            } => Some(ServerMessage::Tick {
                seconds_left,
                revealed_answer,
            }),
            SessionEvent::TimedOut { final_score } => Some(ServerMessage::TimedOut { final_score }),
            SessionEvent::GameOver { final_score } => Some(ServerMessage::GameOver { final_score }),
        }
    }

    pub fn redeemed(redemption: Redemption) -> Self {
        ServerMessage::Redeemed {
            redemption,
            message: format!("✅ {} unlocked!", redemption),
        }
    }

    /// True for messages that end the run
    pub fn ends_run(&self) -> bool {
        matches!(
            self,
            ServerMessage::TimedOut { .. } | ServerMessage::GameOver { .. }
        )
    }
}
