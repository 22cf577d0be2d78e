// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,

    /// The text content of the question.
    pub text: String,
}

/// Represents the 'options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OptionRow {
    pub option_id: i64,

    /// The question this option belongs to.
    pub question_id: i64,

    pub text: String,

    /// Stored as INTEGER 0/1 in SQLite.
    pub is_correct: bool,
}

/// A question joined with its options, as loaded for quiz sessions.
#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub question_id: i64,
    pub text: String,

    /// Options in `option_id` order. Exactly one has `is_correct = true`.
    pub options: Vec<OptionRow>,
}

impl QuizQuestion {
    /// The id of the correct option, if the invariant holds.
    pub fn correct_option(&self) -> Option<i64> {
        self.options.iter().find(|o| o.is_correct).map(|o| o.option_id)
    }
}

/// DTO for sending an option to the client (excludes `is_correct`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicOption {
    pub option_id: i64,
    pub text: String,
}

impl From<&OptionRow> for PublicOption {
    fn from(row: &OptionRow) -> Self {
        Self {
            option_id: row.option_id,
            text: row.text.clone(),
        }
    }
}

/// A question ready for bulk insert, produced by the generation pipeline.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}
