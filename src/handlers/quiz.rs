use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::models::QuizView,
    extractors::AuthGuard,
    models::{CategorySelector, QuestionSource},
    names,
    rejections::AppError,
    services::quiz::AnswerOutcome,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::CREATE_QUIZ_URL, post(create_quiz))
        .route(names::VERIFY_ANSWER_URL, post(verify_answer))
        .route(names::QUIZ_URL, get(get_quiz))
        .route(names::CHEAT_SHEET_URL, post(redeem_cheat_sheet))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateQuizBody {
    username: String,
    category_name: String,
    #[serde(default)]
    source: QuestionSource,
}

#[derive(Deserialize)]
struct VerifyAnswerBody {
    #[serde(rename = "quizID")]
    quiz_id: String,
    answer: String,
}

#[derive(Deserialize)]
struct CheatSheetBody {
    #[serde(rename = "quizID")]
    quiz_id: String,
    rarity: i64,
}

async fn create_quiz(
    guard: AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<CreateQuizBody>, JsonRejection>,
) -> Result<Json<QuizView>, AppError> {
    let Json(body) = payload?;
    guard.ensure_self(&body.username)?;

    if body.category_name.trim().is_empty() {
        return Err(AppError::Input("categoryName is required".to_string()));
    }

    let selector = CategorySelector {
        source: body.source,
        name: body.category_name,
    };
    let quiz = state.quizzes.get_or_create_quiz(&guard.0, &selector).await?;
    Ok(Json(quiz.view()))
}

async fn get_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, AppError> {
    Ok(Json(state.quizzes.get_quiz(&user, &quiz_id).await?.view()))
}

async fn verify_answer(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<VerifyAnswerBody>, JsonRejection>,
) -> Result<Json<AnswerOutcome>, AppError> {
    let Json(body) = payload?;
    let outcome = state
        .quizzes
        .submit_answer(&user, &body.quiz_id, &body.answer)
        .await?;
    Ok(Json(outcome))
}

async fn redeem_cheat_sheet(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<CheatSheetBody>, JsonRejection>,
) -> Result<Json<Vec<String>>, AppError> {
    let Json(body) = payload?;
    let hints = state
        .quizzes
        .redeem_hint(&user, &body.quiz_id, body.rarity)
        .await?;
    Ok(Json(hints))
}
