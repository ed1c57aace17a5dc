//! Question bank
//!
//! Questions are loaded once at startup from one JSON file per theme and are
//! read-only afterwards. The bank is shared behind an `Arc` by every session.

mod hints;

pub use hints::FriendTemplates;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StorageError;
use crate::types::{Difficulty, Question, ThemeName};

/// Optional manifest in the questions directory mapping theme name to file name
pub const MANIFEST_FILE: &str = "themes.json";

/// Theme files used when no manifest is present
pub const DEFAULT_THEME_FILES: &[(&str, &str)] = &[
    ("Friends", "FRIENDS.txt"),
    ("Naruto", "Naruto.txt"),
    ("Avengers", "avengers.txt"),
    ("The Office", "Office.txt"),
    ("The Big Bang Theory", "TBBT.txt"),
];

/// Question record as it appears in a theme file
#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
    #[serde(default)]
    difficulty: Option<serde_json::Value>,
}

impl RawQuestion {
    fn into_question(self, theme: &str) -> Option<Question> {
        if self.options.len() < 2 || !self.options.contains(&self.answer) {
            return None;
        }
        let difficulty =
            Difficulty::parse_lenient(self.difficulty.as_ref().and_then(|v| v.as_str()));
        Some(Question {
            text: self.question,
            options: self.options,
            answer: self.answer,
            difficulty,
            theme: theme.to_string(),
        })
    }
}

/// All questions, grouped by theme
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    themes: Vec<(ThemeName, Vec<Question>)>,
}

impl QuestionBank {
    /// Build a bank from already-parsed questions, grouping them by their theme
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut bank = Self::default();
        for question in questions {
            match bank.themes.iter_mut().find(|(t, _)| *t == question.theme) {
                Some((_, list)) => list.push(question),
                None => bank.themes.push((question.theme.clone(), vec![question])),
            }
        }
        bank
    }

    /// Load every theme file from a directory.
    ///
    /// Missing theme files are skipped with a warning, malformed JSON is an error.
    /// Individual records that fail validation are dropped.
    pub fn load_dir(dir: &Path) -> Result<Self, StorageError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let theme_files: Vec<(String, String)> = if manifest_path.is_file() {
            let raw = std::fs::read_to_string(&manifest_path)
                .map_err(|e| StorageError::io(&manifest_path, e))?;
            let manifest: BTreeMap<String, String> = serde_json::from_str(&raw)
                .map_err(|e| StorageError::json(&manifest_path, e))?;
            manifest.into_iter().collect()
        } else {
            DEFAULT_THEME_FILES
                .iter()
                .map(|(theme, file)| (theme.to_string(), file.to_string()))
                .collect()
        };

        let mut bank = Self::default();
        for (theme, file) in theme_files {
            let path = dir.join(&file);
            if !path.is_file() {
                tracing::warn!("Question file for theme '{}' not found at {}", theme, path.display());
                continue;
            }

            let raw = std::fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
            let records: Vec<RawQuestion> =
                serde_json::from_str(&raw).map_err(|e| StorageError::json(&path, e))?;
            let total = records.len();
            let questions: Vec<Question> = records
                .into_iter()
                .filter_map(|r| r.into_question(&theme))
                .collect();

            if questions.len() < total {
                tracing::warn!(
                    "Skipped {} invalid question(s) in {}",
                    total - questions.len(),
                    path.display()
                );
            }
            tracing::info!("Loaded {} questions for theme '{}'", questions.len(), theme);
            bank.themes.push((theme, questions));
        }

        Ok(bank)
    }

    /// Theme names in load order
    pub fn themes(&self) -> Vec<&str> {
        self.themes.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|(t, _)| t == theme)
    }

    /// Questions of one theme
    pub fn questions(&self, theme: &str) -> &[Question] {
        self.themes
            .iter()
            .find(|(t, _)| t == theme)
            .map(|(_, qs)| qs.as_slice())
            .unwrap_or(&[])
    }

    /// Selection pool: one theme, or the union of all themes
    pub fn pool(&self, theme: Option<&str>) -> Vec<&Question> {
        match theme {
            Some(theme) => self.questions(theme).iter().collect(),
            None => self.themes.iter().flat_map(|(_, qs)| qs.iter()).collect(),
        }
    }

    /// Total number of questions across all themes
    pub fn len(&self) -> usize {
        self.themes.iter().map(|(_, qs)| qs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
