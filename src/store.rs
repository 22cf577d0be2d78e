// src/store.rs

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::models::question::{NewQuestion, OptionRow, Question, QuizQuestion};

/// Loads every question with its options, both in id order.
///
/// Two queries grouped in memory; the store is small enough that paging
/// is not worth it.
pub async fn fetch_all_questions(pool: &SqlitePool) -> Result<Vec<QuizQuestion>, sqlx::Error> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT question_id, text FROM questions ORDER BY question_id",
    )
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, OptionRow>(
        "SELECT option_id, question_id, text, is_correct FROM options ORDER BY option_id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<OptionRow>> = HashMap::new();
    for option in options {
        by_question.entry(option.question_id).or_default().push(option);
    }

    Ok(questions
        .into_iter()
        .map(|q| QuizQuestion {
            options: by_question.remove(&q.question_id).unwrap_or_default(),
            question_id: q.question_id,
            text: q.text,
        })
        .collect())
}

/// Destructively replaces the whole store with `questions`.
///
/// Clears both tables, resets their autoincrement counters so ids start
/// from 1 again, and bulk-inserts inside one transaction. Regeneration is
/// a replace, never an upsert.
pub async fn replace_all(pool: &SqlitePool, questions: &[NewQuestion]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM options").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'questions' OR name = 'options'")
        .execute(&mut *tx)
        .await?;

    for question in questions {
        let question_id = sqlx::query("INSERT INTO questions (text) VALUES (?1)")
            .bind(&question.text)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for option in &question.options {
            sqlx::query("INSERT INTO options (question_id, text, is_correct) VALUES (?1, ?2, ?3)")
                .bind(question_id)
                .bind(&option.text)
                .bind(option.is_correct)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}
