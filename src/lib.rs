pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod services;

use axum::Router;

use services::{
    auth::AuthService, category::CategoryService, content::Content, gacha::GachaService,
    ledger::LedgerService, quiz::QuizService,
};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub ledger: LedgerService,
    pub categories: CategoryService,
    pub quizzes: QuizService,
    pub gacha: GachaService,
}

impl AppState {
    /// Wire every service to the same store.
    pub fn new(
        db: db::Db,
        content: Content,
        questions_per_quiz: usize,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            auth: AuthService::new(db.clone(), timeout),
            ledger: LedgerService::new(db.clone(), timeout),
            categories: CategoryService::new(db.clone(), timeout),
            quizzes: QuizService::new(db.clone(), content, questions_per_quiz, timeout),
            gacha: GachaService::new(db, timeout),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::user::routes())
        .merge(handlers::category::routes())
        .merge(handlers::quiz::routes())
        .merge(handlers::gacha::routes())
        .with_state(state)
}
