// tests/quiz_flow.rs

use mcquiz::config::Config;
use mcquiz::models::question::{NewOption, NewQuestion};
use mcquiz::routes;
use mcquiz::state::{AppState, SessionStore};
use mcquiz::store;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool for
/// seeding.
async fn spawn_app() -> (String, SqlitePool) {
    // Each test gets its own throwaway SQLite file.
    let db_path = std::env::temp_dir().join(format!("mcquiz-test-{}.db", uuid::Uuid::new_v4()));
    let database_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate test database");

    let config = Config {
        database_url,
        gemini_api_key: None,
        gemini_model: "gemini-2.5-pro".to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        sessions: SessionStore::default(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// A browser-like client: keeps the session cookie between requests.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Three questions; the correct option is always the one whose text is
/// "Correct" so tests can choose right/wrong answers by text.
fn sample_questions() -> Vec<NewQuestion> {
    ["Q1", "Q2", "Q3"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut options: Vec<NewOption> = ["Wrong A", "Wrong B", "Wrong C"]
                .iter()
                .map(|t| NewOption {
                    text: (*t).to_string(),
                    is_correct: false,
                })
                .collect();
            // vary the correct position across questions
            options.insert(
                i % 4,
                NewOption {
                    text: "Correct".to_string(),
                    is_correct: true,
                },
            );
            NewQuestion {
                text: (*text).to_string(),
                options,
            }
        })
        .collect()
}

async fn get_question(client: &reqwest::Client, address: &str) -> serde_json::Value {
    client
        .get(format!("{}/api/quiz/question", address))
        .send()
        .await
        .expect("Failed to fetch question")
        .json()
        .await
        .expect("Failed to parse question json")
}

async fn post(client: &reqwest::Client, address: &str, route: &str) -> serde_json::Value {
    client
        .post(format!("{}/api/quiz/{}", address, route))
        .send()
        .await
        .expect("Failed to post")
        .json()
        .await
        .expect("Failed to parse json")
}

async fn submit(client: &reqwest::Client, address: &str, option_id: i64) -> serde_json::Value {
    client
        .post(format!("{}/api/quiz/answer", address))
        .json(&serde_json::json!({ "option_id": option_id }))
        .send()
        .await
        .expect("Failed to submit answer")
        .json()
        .await
        .expect("Failed to parse answer json")
}

/// Picks an option id from a question view by whether it should be correct.
fn option_by_correctness(view: &serde_json::Value, want_correct: bool) -> i64 {
    view["options"]
        .as_array()
        .expect("question view has options")
        .iter()
        .find(|o| (o["text"] == "Correct") == want_correct)
        .expect("option with requested correctness")["option_id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn empty_store_renders_explicit_empty_states() {
    let (address, _pool) = spawn_app().await;
    let client = client();

    let question = get_question(&client, &address).await;
    assert_eq!(question["state"], "no_questions");

    let start = post(&client, &address, "start").await;
    assert_eq!(start["state"], "no_questions");

    let results: serde_json::Value = client
        .get(format!("{}/api/quiz/results", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["total"], 0);
    assert_eq!(results["correct_count"], 0);
    assert_eq!(results["has_wrong_answers"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (address, _pool) = spawn_app().await;

    let response = reqwest::get(format!("{}/random_path_that_does_not_exist", address))
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn full_run_with_wrong_answers_scores_and_retries() {
    let (address, pool) = spawn_app().await;
    store::replace_all(&pool, &sample_questions()).await.unwrap();
    let client = client();

    let view = post(&client, &address, "start").await;
    assert_eq!(view["state"], "question");
    assert_eq!(view["total_questions"], 3);
    assert_eq!(view["reveal"], serde_json::Value::Null);

    // Answer Q2 correctly and the other two wrong, whatever order the
    // shuffle produced.
    let mut view = view;
    for turn in 1..=3 {
        assert_eq!(view["question_number"], turn);
        let answer_correctly = view["text"] == "Q2";
        let option_id = option_by_correctness(&view, answer_correctly);

        let revealed = submit(&client, &address, option_id).await;
        assert_eq!(revealed["reveal"]["is_correct"], answer_correctly);
        assert_eq!(revealed["reveal"]["selected_option"], option_id);

        view = post(&client, &address, "advance").await;
    }
    assert_eq!(view["state"], "completed");

    let results: serde_json::Value = client
        .get(format!("{}/api/quiz/results", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["total"], 3);
    assert_eq!(results["correct_count"], 1);
    assert_eq!(results["has_wrong_answers"], true);
    for entry in results["results"].as_array().unwrap() {
        let expected = entry["text"] == "Q2";
        assert_eq!(entry["is_correct"], expected);
        assert_eq!(entry["correct"]["text"], "Correct");
    }

    // The retry run covers exactly the two wrong questions.
    let retry = post(&client, &address, "retry-wrong").await;
    assert_eq!(retry["state"], "question");
    assert_eq!(retry["total_questions"], 2);
    assert_ne!(retry["text"], "Q2");
}

#[tokio::test]
async fn resubmitting_before_advancing_overwrites_the_answer() {
    let (address, pool) = spawn_app().await;
    store::replace_all(&pool, &sample_questions()[..1]).await.unwrap();
    let client = client();

    let view = post(&client, &address, "start").await;
    let wrong = option_by_correctness(&view, false);
    let right = option_by_correctness(&view, true);

    let first = submit(&client, &address, wrong).await;
    assert_eq!(first["reveal"]["is_correct"], false);

    let second = submit(&client, &address, right).await;
    assert_eq!(second["reveal"]["is_correct"], true);

    post(&client, &address, "advance").await;
    let results: serde_json::Value = client
        .get(format!("{}/api/quiz/results", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["correct_count"], 1);
    assert_eq!(results["has_wrong_answers"], false);
}

#[tokio::test]
async fn advancing_without_an_answer_skips_without_marking_wrong() {
    let (address, pool) = spawn_app().await;
    store::replace_all(&pool, &sample_questions()[..1]).await.unwrap();
    let client = client();

    post(&client, &address, "start").await;
    let view = post(&client, &address, "advance").await;
    assert_eq!(view["state"], "completed");

    let results: serde_json::Value = client
        .get(format!("{}/api/quiz/results", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["total"], 1);
    assert_eq!(results["correct_count"], 0);
    // skipped, not wrong: nothing to retry
    assert_eq!(results["has_wrong_answers"], false);

    // retry-wrong with a clean slate falls back to a fresh full run
    let retry = post(&client, &address, "retry-wrong").await;
    assert_eq!(retry["state"], "question");
    assert_eq!(retry["total_questions"], 1);
    assert_eq!(retry["reveal"], serde_json::Value::Null);
}

#[tokio::test]
async fn submitting_a_foreign_option_is_rejected() {
    let (address, pool) = spawn_app().await;
    store::replace_all(&pool, &sample_questions()).await.unwrap();
    let client = client();

    post(&client, &address, "start").await;
    let response = client
        .post(format!("{}/api/quiz/answer", address))
        .json(&serde_json::json!({ "option_id": 999_999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn sessions_are_isolated_per_cookie() {
    let (address, pool) = spawn_app().await;
    store::replace_all(&pool, &sample_questions()[..1]).await.unwrap();

    let alice = client();
    let bob = client();

    let view = post(&alice, &address, "start").await;
    let option_id = option_by_correctness(&view, true);
    let revealed = submit(&alice, &address, option_id).await;
    assert_ne!(revealed["reveal"], serde_json::Value::Null);

    // A different cookie jar sees an untouched run.
    let fresh = get_question(&bob, &address).await;
    assert_eq!(fresh["state"], "question");
    assert_eq!(fresh["reveal"], serde_json::Value::Null);
}

#[tokio::test]
async fn regeneration_replaces_rows_and_resets_ids() {
    let (_address, pool) = spawn_app().await;

    store::replace_all(&pool, &sample_questions()).await.unwrap();
    store::replace_all(&pool, &sample_questions()[..1]).await.unwrap();

    let questions = store::fetch_all_questions(&pool).await.unwrap();
    assert_eq!(questions.len(), 1);
    // autoincrement counters were reset by the destructive replace
    assert_eq!(questions[0].question_id, 1);
    assert_eq!(questions[0].options.len(), 4);
    assert_eq!(questions[0].options[0].option_id, 1);
    assert_eq!(
        questions[0]
            .options
            .iter()
            .filter(|o| o.is_correct)
            .count(),
        1
    );
}
