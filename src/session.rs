// src/session.rs

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::models::question::QuizQuestion;

/// Where a quiz run currently stands for one user.
///
/// Submitting while already revealed is legal (the selection is simply
/// overwritten); submitting or advancing after completion is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected for the current question yet.
    AwaitingAnswer,
    /// A selection was recorded and correctness is being shown, but the
    /// run has not moved on yet.
    AnswerRevealed { selected: i64 },
    /// `current_index` reached the end of the run.
    Completed,
}

/// One quiz attempt, from start to scored completion.
///
/// This is a plain value: the presentation layer persists and retrieves it
/// per user and hands it to every operation explicitly. It never touches
/// the database; callers pass in the loaded question pool where an
/// operation needs correctness information.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Question ids defining this run, in play order.
    question_order: Vec<i64>,
    /// Zero-based cursor into `question_order`; equals its length once the
    /// run is complete.
    current_index: usize,
    /// Last selection per question. Overwritten on re-submission.
    answers: HashMap<i64, i64>,
    /// Questions answered incorrectly during this run, in encounter order,
    /// deduplicated. Only grows on the reveal -> advance transition.
    wrong_questions: Vec<i64>,
    phase: Phase,
}

/// Per-question outcome inside a [`ScoreReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub question_id: i64,
    pub selected: Option<i64>,
    pub correct: Option<i64>,
    pub is_correct: bool,
}

/// Result of scoring a run. Producing one never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub entries: Vec<ScoreEntry>,
    pub correct_count: usize,
    pub total: usize,
}

impl SessionState {
    /// Builds a new run over `pool`.
    ///
    /// With no subset the order is a random permutation of the pool's ids.
    /// With a subset (retry runs) the given order is kept, filtered to ids
    /// still present in the pool. An empty resulting order starts the run
    /// already completed; callers surface that as "no quiz available".
    pub fn start(pool: &[QuizQuestion], subset: Option<&[i64]>) -> Self {
        let question_order: Vec<i64> = match subset {
            Some(ids) => ids
                .iter()
                .copied()
                .filter(|id| pool.iter().any(|q| q.question_id == *id))
                .collect(),
            None => {
                let mut ids: Vec<i64> = pool.iter().map(|q| q.question_id).collect();
                ids.shuffle(&mut rand::rng());
                ids
            }
        };

        let phase = if question_order.is_empty() {
            Phase::Completed
        } else {
            Phase::AwaitingAnswer
        };

        Self {
            question_order,
            current_index: 0,
            answers: HashMap::new(),
            wrong_questions: Vec::new(),
            phase,
        }
    }

    /// The id of the question at the cursor, or `None` once completed.
    pub fn current_question(&self) -> Option<i64> {
        self.question_order.get(self.current_index).copied()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// 1-based position of the current question, for display.
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn total_questions(&self) -> usize {
        self.question_order.len()
    }

    pub fn has_wrong_answers(&self) -> bool {
        !self.wrong_questions.is_empty()
    }

    pub fn selected_option(&self, question_id: i64) -> Option<i64> {
        self.answers.get(&question_id).copied()
    }

    /// Records `option_id` as the answer to the current question and moves
    /// to the reveal. Re-submission before advancing overwrites the earlier
    /// selection. Returns `false` (and changes nothing) when the run is
    /// already complete.
    pub fn submit_answer(&mut self, option_id: i64) -> bool {
        let Some(question_id) = self.current_question() else {
            return false;
        };
        self.answers.insert(question_id, option_id);
        self.phase = Phase::AnswerRevealed {
            selected: option_id,
        };
        true
    }

    /// Moves past the current question.
    ///
    /// If a selection was revealed and does not match the question's correct
    /// option, the question id joins `wrong_questions` (once). Advancing with
    /// no selection at all is tolerated: the question is skipped and counts
    /// as "not wrong". Returns `false` when the run is already complete.
    pub fn advance(&mut self, pool: &[QuizQuestion]) -> bool {
        let Some(question_id) = self.current_question() else {
            return false;
        };

        if let Phase::AnswerRevealed { selected } = self.phase {
            let correct = find_question(pool, question_id).and_then(QuizQuestion::correct_option);
            if Some(selected) != correct && !self.wrong_questions.contains(&question_id) {
                self.wrong_questions.push(question_id);
            }
        }

        self.current_index += 1;
        self.phase = if self.current_index >= self.question_order.len() {
            Phase::Completed
        } else {
            Phase::AwaitingAnswer
        };
        true
    }

    /// Starts a new run over exactly the questions answered wrong in this
    /// one, in the order they were recorded. Returns `None` when nothing was
    /// wrong; the caller then routes back to a fresh full run.
    pub fn retry_wrong(&self, pool: &[QuizQuestion]) -> Option<Self> {
        if self.wrong_questions.is_empty() {
            return None;
        }
        Some(Self::start(pool, Some(&self.wrong_questions)))
    }

    /// Scores the run against `pool`. Unanswered questions score as
    /// incorrect; questions no longer present in the pool are skipped.
    /// Idempotent and side-effect-free.
    pub fn score(&self, pool: &[QuizQuestion]) -> ScoreReport {
        let mut entries = Vec::new();
        let mut correct_count = 0;

        for question_id in &self.question_order {
            let Some(question) = find_question(pool, *question_id) else {
                continue;
            };
            let selected = self.answers.get(question_id).copied();
            let correct = question.correct_option();
            let is_correct = selected.is_some() && selected == correct;
            if is_correct {
                correct_count += 1;
            }
            entries.push(ScoreEntry {
                question_id: *question_id,
                selected,
                correct,
                is_correct,
            });
        }

        let total = entries.len();
        ScoreReport {
            entries,
            correct_count,
            total,
        }
    }
}

fn find_question(pool: &[QuizQuestion], question_id: i64) -> Option<&QuizQuestion> {
    pool.iter().find(|q| q.question_id == question_id)
}
