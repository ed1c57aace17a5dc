//! Leaderboard store: best score per `(theme, nickname, pin)`

use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::JsonFile;
use crate::error::StorageError;
use crate::types::LeaderboardEntry;

type LeaderboardDoc = BTreeMap<String, u32>;

/// Joins theme, nickname and PIN into a leaderboard key
pub const KEY_SEPARATOR: char = '|';

fn entry_key(theme: &str, nickname: &str, pin: &str) -> String {
    format!("{theme}{KEY_SEPARATOR}{nickname}{KEY_SEPARATOR}{pin}")
}

#[derive(Debug)]
pub struct LeaderboardStore {
    file: JsonFile,
    lock: Mutex<()>,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Store `score` if it beats the stored best for this key. Returns whether it was written.
    pub async fn record_if_higher(
        &self,
        theme: &str,
        nickname: &str,
        pin: &str,
        score: u32,
    ) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut doc: LeaderboardDoc = self.file.load_or_default().await?;

        let key = entry_key(theme, nickname, pin);
        let best = doc.get(&key).copied().unwrap_or(0);
        if score <= best {
            return Ok(false);
        }

        doc.insert(key, score);
        self.file.save(&doc).await?;
        tracing::info!("New best for {} in '{}': {}", nickname, theme, score);
        Ok(true)
    }

    /// Best `limit` scores of a theme, highest first. Anonymous entries are hidden.
    pub async fn top(&self, theme: &str, limit: usize) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let doc: LeaderboardDoc = {
            let _guard = self.lock.lock().await;
            self.file.load_or_default().await?
        };

        let mut rows: Vec<(String, u32)> = doc
            .into_iter()
            .filter_map(|(key, score)| {
                let mut parts = key.splitn(3, KEY_SEPARATOR);
                let entry_theme = parts.next()?;
                let nickname = parts.next()?;
                (entry_theme == theme && !nickname.trim().is_empty())
                    .then(|| (nickname.to_string(), score))
            })
            .collect();

        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(rows
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (nickname, score))| LeaderboardEntry {
                rank: i + 1,
                nickname,
                score,
            })
            .collect())
    }

    /// Hold the store lock, as a slow write would
    #[cfg(test)]
    pub(crate) async fn hold_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
