// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::question::{PublicOption, QuizQuestion},
    session::{Phase, SessionState},
    state::AppState,
    store,
    utils::cookies::SessionToken,
};

/// What the question flow renders for the client.
///
/// The empty store is an explicit state rather than an error, and a
/// finished run points the client at the results view.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizView {
    NoQuestions,
    Question {
        question_id: i64,
        text: String,
        options: Vec<PublicOption>,
        question_number: usize,
        total_questions: usize,
        /// Present only after an answer was submitted for this question.
        reveal: Option<Reveal>,
    },
    Completed {
        total_questions: usize,
    },
}

/// Correctness feedback shown between submitting and advancing.
#[derive(Debug, Serialize)]
pub struct Reveal {
    pub selected_option: i64,
    pub correct_option: Option<i64>,
    pub is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub option_id: i64,
}

/// One row of the final results breakdown.
#[derive(Debug, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub text: String,
    pub selected: Option<PublicOption>,
    pub correct: Option<PublicOption>,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub results: Vec<QuestionResult>,
    pub correct_count: usize,
    pub total: usize,
    /// Whether a retry-wrong run is worth offering.
    pub has_wrong_answers: bool,
}

/// Starts a fresh shuffled run over the whole store.
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let session = SessionState::start(&questions, None);
    let view = quiz_view(&session, &questions);
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// Shows the current question, with the reveal block once an answer is in.
pub async fn current_question(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let session = load_or_start(&state, token, &questions).await;
    let view = quiz_view(&session, &questions);
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// Records an answer for the current question and reveals correctness.
///
/// Submitting again before advancing overwrites the earlier choice. On a
/// completed run this is a no-op that returns the safe current view.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let mut session = load_or_start(&state, token, &questions).await;

    if let Some(question) = session
        .current_question()
        .and_then(|id| find_question(&questions, id))
    {
        if !question
            .options
            .iter()
            .any(|o| o.option_id == payload.option_id)
        {
            return Err(AppError::BadRequest(format!(
                "Option {} does not belong to the current question",
                payload.option_id
            )));
        }
        session.submit_answer(payload.option_id);
    }

    let view = quiz_view(&session, &questions);
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// Moves on to the next question (or completion), tracking wrong answers.
pub async fn advance(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let mut session = load_or_start(&state, token, &questions).await;
    session.advance(&questions);
    let view = quiz_view(&session, &questions);
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// Starts a run over the questions answered wrong, or a fresh full run
/// when there is nothing to retry.
pub async fn retry_wrong(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let session = match state.sessions.get(token).await {
        Some(existing) => existing
            .retry_wrong(&questions)
            .unwrap_or_else(|| SessionState::start(&questions, None)),
        None => SessionState::start(&questions, None),
    };
    let view = quiz_view(&session, &questions);
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// Scores the run and joins the report with question and option texts.
pub async fn results(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store::fetch_all_questions(&state.pool).await?;
    let session = load_or_start(&state, token, &questions).await;
    let report = session.score(&questions);

    let results = report
        .entries
        .iter()
        .filter_map(|entry| {
            let question = find_question(&questions, entry.question_id)?;
            Some(QuestionResult {
                question_id: question.question_id,
                text: question.text.clone(),
                selected: option_view(question, entry.selected),
                correct: option_view(question, entry.correct),
                is_correct: entry.is_correct,
            })
        })
        .collect();

    let view = ResultsView {
        results,
        correct_count: report.correct_count,
        total: report.total,
        has_wrong_answers: session.has_wrong_answers(),
    };
    state.sessions.put(token, session).await;
    Ok(Json(view))
}

/// A request without a stored session implicitly begins a fresh run.
async fn load_or_start(state: &AppState, token: Uuid, questions: &[QuizQuestion]) -> SessionState {
    match state.sessions.get(token).await {
        Some(session) => session,
        None => SessionState::start(questions, None),
    }
}

fn quiz_view(session: &SessionState, questions: &[QuizQuestion]) -> QuizView {
    if questions.is_empty() {
        return QuizView::NoQuestions;
    }

    let current = session
        .current_question()
        .and_then(|id| find_question(questions, id));
    let Some(question) = current else {
        // Past the end, or the current question vanished in a regeneration;
        // either way the results view is the safe place to land.
        return QuizView::Completed {
            total_questions: session.total_questions(),
        };
    };

    let reveal = match session.phase() {
        Phase::AnswerRevealed { selected } => {
            let correct_option = question.correct_option();
            Some(Reveal {
                selected_option: selected,
                correct_option,
                is_correct: Some(selected) == correct_option,
            })
        }
        _ => None,
    };

    QuizView::Question {
        question_id: question.question_id,
        text: question.text.clone(),
        options: question.options.iter().map(PublicOption::from).collect(),
        question_number: session.question_number(),
        total_questions: session.total_questions(),
        reveal,
    }
}

fn find_question(questions: &[QuizQuestion], question_id: i64) -> Option<&QuizQuestion> {
    questions.iter().find(|q| q.question_id == question_id)
}

fn option_view(question: &QuizQuestion, option_id: Option<i64>) -> Option<PublicOption> {
    option_id
        .and_then(|id| question.options.iter().find(|o| o.option_id == id))
        .map(PublicOption::from)
}
