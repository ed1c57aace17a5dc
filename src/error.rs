use std::path::PathBuf;

use crate::types::Lifeline;

/// Result type for quiz operations
pub type QuizResult<T> = Result<T, QuizError>;

/// Errors raised by the quiz engine. Everything except `Storage` is
/// recoverable and is shown to the acting player.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Please pick an option.")]
    NoSelection,

    #[error("Not enough options")]
    InsufficientOptions,

    #[error("{0} is not available")]
    LifelineUnavailable(Lifeline),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: String,
    },

    #[error("Invalid code.")]
    VoucherNotFound,

    #[error("Code already used.")]
    VoucherAlreadyUsed,

    #[error("No quiz in progress")]
    NoActiveSession,

    #[error("Unknown player")]
    PlayerNotFound,

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Nickname & PIN required")]
    MissingCredentials,

    #[error("Nickname & PIN cannot contain '|'")]
    InvalidCredentials,

    #[error("Enter feedback before submitting.")]
    EmptyFeedback,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    /// Stable machine-readable code for the wire protocol
    pub fn code(&self) -> &'static str {
        match self {
            QuizError::NoSelection => "NO_SELECTION",
            QuizError::InsufficientOptions => "INSUFFICIENT_OPTIONS",
            QuizError::LifelineUnavailable(_) => "LIFELINE_UNAVAILABLE",
            QuizError::InvalidTransition { .. } => "INVALID_TRANSITION",
            QuizError::VoucherNotFound => "VOUCHER_NOT_FOUND",
            QuizError::VoucherAlreadyUsed => "VOUCHER_ALREADY_USED",
            QuizError::NoActiveSession => "NO_ACTIVE_SESSION",
            QuizError::PlayerNotFound => "PLAYER_NOT_FOUND",
            QuizError::UnknownTheme(_) => "UNKNOWN_THEME",
            QuizError::MissingCredentials => "MISSING_CREDENTIALS",
            QuizError::InvalidCredentials => "INVALID_CREDENTIALS",
            QuizError::EmptyFeedback => "EMPTY_FEEDBACK",
            QuizError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Failures of the flat-file persistence layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Json {
            path: path.into(),
            source,
        }
    }
}
