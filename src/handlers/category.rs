use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::models::Category, extractors::AuthGuard, models::Question, names, rejections::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            names::CATEGORIES_URL,
            get(list_categories).post(create_category),
        )
        .route(names::CATEGORY_QUESTION_URL, post(add_question))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCategory {
    category_name: String,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewQuestion {
    category_name: String,
    question: Question,
}

async fn list_categories(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.categories(&user).await?))
}

async fn create_category(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state
        .categories
        .create_category(&user, &body.category_name, &body.questions)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn add_question(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state
        .categories
        .add_question(&user, &body.category_name, &body.question)
        .await?;
    Ok(StatusCode::CREATED)
}
