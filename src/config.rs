//! Runtime configuration loaded from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the quiz server
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Directory holding vouchers.json, leaderboard.json and feedback.txt
    pub data_dir: PathBuf,
    /// Directory holding one question file per theme
    pub questions_dir: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Countdown budget per question
    pub question_time: Duration,
    /// Remaining time at which the early-reveal perk shows the answer
    pub early_reveal_at: Duration,
    /// Number of rows shown on the leaderboard
    pub leaderboard_size: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            questions_dir: PathBuf::from("data").join("questions"),
            port: 8080,
            question_time: Duration::from_secs(30),
            early_reveal_at: Duration::from_secs(10),
            leaderboard_size: 20,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl QuizConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = non_empty_var("QUIZ_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let questions_dir = non_empty_var("QUIZ_QUESTIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("questions"));

        Self {
            data_dir,
            questions_dir,
            port: non_empty_var("QUIZ_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            question_time: non_empty_var("QUIZ_QUESTION_SECONDS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.question_time),
            early_reveal_at: non_empty_var("QUIZ_EARLY_REVEAL_SECONDS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.early_reveal_at),
            leaderboard_size: non_empty_var("QUIZ_LEADERBOARD_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.leaderboard_size),
        }
    }

    pub fn vouchers_path(&self) -> PathBuf {
        self.data_dir.join("vouchers.json")
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.data_dir.join("leaderboard.json")
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join("feedback.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "QUIZ_DATA_DIR",
        "QUIZ_QUESTIONS_DIR",
        "QUIZ_PORT",
        "QUIZ_QUESTION_SECONDS",
        "QUIZ_EARLY_REVEAL_SECONDS",
        "QUIZ_LEADERBOARD_SIZE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = QuizConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.question_time, Duration::from_secs(30));
        assert_eq!(config.early_reveal_at, Duration::from_secs(10));
        assert_eq!(config.leaderboard_size, 20);
        assert_eq!(config.questions_dir, PathBuf::from("data").join("questions"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("QUIZ_DATA_DIR", "/srv/quiz");
        std::env::set_var("QUIZ_QUESTION_SECONDS", "45");
        std::env::set_var("QUIZ_PORT", "   ");

        let config = QuizConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("/srv/quiz"));
        assert_eq!(config.questions_dir, PathBuf::from("/srv/quiz/questions"));
        assert_eq!(config.question_time, Duration::from_secs(45));
        // Blank values fall back to defaults
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.vouchers_path(),
            PathBuf::from("/srv/quiz/vouchers.json")
        );

        clear_env();
    }
}
