use super::AppState;
use crate::error::{QuizResult, StorageError};
use crate::types::LeaderboardEntry;

impl AppState {
    /// Top scores of a theme, as many as the configured board size
    pub async fn leaderboard_top(&self, theme: &str) -> Result<Vec<LeaderboardEntry>, StorageError> {
        self.leaderboard
            .top(theme, self.config.leaderboard_size)
            .await
    }

    pub async fn submit_feedback(&self, message: &str) -> QuizResult<()> {
        self.feedback.append(message).await
    }
}
