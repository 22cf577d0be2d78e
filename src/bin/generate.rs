// src/bin/generate.rs

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dotenvy::dotenv;
use mcquiz::config::Config;
use mcquiz::generation;
use mcquiz::models::question::NewQuestion;
use mcquiz::store;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::EnvFilter;

/// Generate multiple choice questions from documents and save them to the
/// quiz database, replacing whatever was there before.
#[derive(Debug, Parser)]
#[command(name = "generate")]
struct Args {
    /// Source documents (pdf, txt, md, pptx, ...)
    files: Vec<PathBuf>,

    /// Number of questions to generate
    #[arg(short = 'n', long, default_value_t = 10)]
    num_questions: u32,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    if args.files.is_empty() {
        eprintln!("Usage: generate <file_path> [file_path2 ...] [-n num_questions]");
        eprintln!("Examples:");
        eprintln!("  generate document.pdf");
        eprintln!("  generate document.pdf -n 15");
        eprintln!("  generate doc1.pdf doc2.pdf slides.pptx -n 20");
        process::exit(1);
    }

    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.rust_log))
        .with_target(false)
        .init();

    let file_word = if args.files.len() == 1 { "file" } else { "files" };
    println!(
        "Generating {} MCQs from {} {}:",
        args.num_questions,
        args.files.len(),
        file_word
    );
    for path in &args.files {
        println!("  - {}", path.display());
    }

    let pool = match SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => fatal(&format!("Failed to open the question database: {e}")),
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        fatal(&format!("Failed to run database migrations: {e}"));
    }

    let response =
        match generation::generate_from_files(&config, &args.files, args.num_questions).await {
            Ok(response) => response,
            Err(e) => fatal(&e.to_string()),
        };

    let questions: Vec<NewQuestion> = response
        .questions
        .into_iter()
        .map(NewQuestion::from)
        .collect();

    if let Err(e) = store::replace_all(&pool, &questions).await {
        fatal(&format!("Failed to save questions: {e}"));
    }

    println!("Successfully generated {} questions!", questions.len());
    println!("Questions saved to {}", config.database_url);
}

fn fatal(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1)
}
