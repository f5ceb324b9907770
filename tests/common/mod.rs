#![allow(dead_code)]

use std::time::Duration;

use quizmaster::db::{AuthUser, Db};
use quizmaster::error::Error;
use quizmaster::models::{CategorySelector, Question, Questions};
use quizmaster::services::content::ContentSource;
use quizmaster::services::quiz::QuizService;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("quizmaster_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("file:{}", path.display());
    Db::new(url, String::new())
        .await
        .expect("failed to create test database")
}

pub async fn create_user(db: &Db, username: &str) -> AuthUser {
    let id = db
        .create_user(username, "password123", "kafka")
        .await
        .expect("create user")
        .expect("username should be free");
    AuthUser {
        id,
        username: username.to_string(),
    }
}

/// Question `i` of a bank whose correct answer is `Correct {i}`.
pub fn make_question(i: usize) -> Question {
    Question {
        question_text: format!("Question {i}"),
        responses: vec![
            format!("Correct {i}"),
            format!("Wrong A {i}"),
            format!("Wrong B {i}"),
            format!("Wrong C {i}"),
        ],
        response_correct: format!("Correct {i}"),
        category: None,
    }
}

pub fn make_questions(n: usize) -> Questions {
    (0..n).map(make_question).collect()
}

/// Content source that serves only the local question bank.
#[derive(Clone)]
pub struct BankOnly(pub Db);

impl ContentSource for BankOnly {
    async fn fetch_batch(
        &self,
        user_id: i64,
        selector: &CategorySelector,
        _amount: usize,
    ) -> Result<Questions, Error> {
        self.0
            .category_questions(user_id, &selector.name)
            .await?
            .ok_or_else(|| Error::CategoryNotFound(selector.name.clone()))
    }
}

pub fn quiz_service(db: &Db) -> QuizService<Db, BankOnly> {
    QuizService::new(db.clone(), BankOnly(db.clone()), 10, TIMEOUT)
}
