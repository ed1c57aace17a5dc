mod player;
mod quiz;
mod records;
mod shop;

pub use player::LobbyView;
pub use quiz::PlaySnapshot;

use crate::bank::{FriendTemplates, QuestionBank};
use crate::config::QuizConfig;
use crate::error::{QuizError, QuizResult, StorageError};
use crate::session::{Session, Timing};
use crate::store::{FeedbackLog, LeaderboardStore, VoucherStore};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything the server knows about one connected player
#[derive(Debug, Clone)]
pub struct PlayerContext {
    pub id: PlayerId,
    pub theme: Option<ThemeName>,
    /// Empty when playing anonymously
    pub nickname: String,
    pub pin: String,
    /// Perks redeemed for the next (or current) run
    pub perks: Perks,
    /// Code of the voucher attached to the next (or current) run
    pub voucher_code: Option<VoucherCode>,
    pub session: Option<Session>,
}

impl PlayerContext {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            theme: None,
            nickname: String::new(),
            pin: String::new(),
            perks: Perks::default(),
            voucher_code: None,
            session: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.nickname.is_empty() || self.pin.is_empty()
    }

    /// Lobby actions are only allowed between runs
    fn ensure_in_lobby(&self, action: &'static str) -> QuizResult<()> {
        match &self.session {
            Some(session) => Err(QuizError::InvalidTransition {
                action,
                phase: session.phase().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn session_mut(&mut self) -> QuizResult<&mut Session> {
        self.session.as_mut().ok_or(QuizError::NoActiveSession)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<QuizConfig>,
    pub bank: Arc<QuestionBank>,
    pub templates: Arc<FriendTemplates>,
    pub vouchers: Arc<VoucherStore>,
    pub leaderboard: Arc<LeaderboardStore>,
    pub feedback: Arc<FeedbackLog>,
    pub players: Arc<RwLock<HashMap<PlayerId, PlayerContext>>>,
}

impl AppState {
    /// Open the stores under `config.data_dir` and wrap the loaded bank
    pub async fn open(config: QuizConfig, bank: QuestionBank) -> Result<Self, StorageError> {
        let vouchers = VoucherStore::open(config.vouchers_path()).await?;
        let leaderboard = LeaderboardStore::new(config.leaderboard_path());
        let feedback = FeedbackLog::new(config.feedback_path());

        tracing::info!(
            "Quiz state ready: {} theme(s), {} question(s), data in {}",
            bank.themes().len(),
            bank.len(),
            config.data_dir.display()
        );

        Ok(Self {
            config: Arc::new(config),
            bank: Arc::new(bank),
            templates: Arc::new(FriendTemplates::default()),
            vouchers: Arc::new(vouchers),
            leaderboard: Arc::new(leaderboard),
            feedback: Arc::new(feedback),
            players: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    fn timing(&self) -> Timing {
        Timing {
            question_time: self.config.question_time,
            early_reveal_at: self.config.early_reveal_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Difficulty, Question};
    use tempfile::TempDir;

    fn bank_question(theme: &str, i: usize, difficulty: Difficulty) -> Question {
        Question {
            text: format!("{} question {}", theme, i),
            options: vec![
                format!("right {}", i),
                "wrong a".to_string(),
                "wrong b".to_string(),
                "wrong c".to_string(),
            ],
            answer: format!("right {}", i),
            difficulty,
            theme: theme.to_string(),
        }
    }

    /// State over a small two-theme bank with its data files in `dir`
    pub(crate) async fn test_state(dir: &TempDir) -> AppState {
        let questions = ["Friends", "Naruto"].into_iter().flat_map(|theme| {
            (0..20).map(move |i| bank_question(theme, i, Difficulty::ALL[i % 4]))
        });
        let config = QuizConfig {
            data_dir: dir.path().to_path_buf(),
            questions_dir: dir.path().join("questions"),
            ..QuizConfig::default()
        };
        AppState::open(config, QuestionBank::from_questions(questions))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_voucher_file() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        assert!(dir.path().join("vouchers.json").exists());
        assert_eq!(state.bank.themes(), vec!["Friends", "Naruto"]);
        assert!(state.players.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_lobby_actions_blocked_during_run() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;
        let id = state.create_player().await;

        state.select_theme(&id, "Friends").await.unwrap();
        state.start_run(&id, GameMode::Mixed).await.unwrap();

        let result = state.select_theme(&id, "Naruto").await;
        assert!(matches!(result, Err(QuizError::InvalidTransition { .. })));
        let result = state.redeem(&id, "ANY").await;
        assert!(matches!(result, Err(QuizError::InvalidTransition { .. })));
    }
}
