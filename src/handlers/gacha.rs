use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::{extractors::AuthGuard, models::Rarity, names, rejections::AppError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(names::GACHA_PULL_URL, post(pull))
}

#[derive(Deserialize)]
struct PullBody {
    username: String,
    quantity: u32,
}

async fn pull(
    guard: AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<PullBody>, JsonRejection>,
) -> Result<Json<Vec<Rarity>>, AppError> {
    let Json(body) = payload?;
    guard.ensure_self(&body.username)?;

    let rarities = state.gacha.pull(&guard.0, body.quantity).await?;
    Ok(Json(rarities))
}
