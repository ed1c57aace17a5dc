//! Append-only feedback log

use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::error::{QuizError, QuizResult, StorageError};

#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one timestamped entry. Blank messages are rejected.
    pub async fn append(&self, message: &str) -> QuizResult<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(QuizError::EmptyFeedback);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let ts = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
        let entry = format!("[{}] {}\n\n", ts, message);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        tracing::info!("Feedback recorded ({} chars)", message.len());
        Ok(())
    }
}
