use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{Profile, TopPlayer},
    extractors::{AuthGuard, BearerToken},
    names,
    rejections::AppError,
    services::auth::LoginOutcome,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::REGISTER_URL, post(register))
        .route(names::LOGIN_URL, post(login))
        .route(names::LOGOUT_URL, post(logout))
        .route(names::TOP_PLAYERS_URL, get(top_players))
        .route(names::PROFILE_URL, get(profile))
        .route(names::ACCOUNT_URL, delete(delete_account))
        .route(names::CHANGE_USERNAME_URL, put(change_username))
        .route(names::CHANGE_PASSWORD_URL, put(change_password))
        .route(names::CHANGE_PICTURE_URL, put(change_picture))
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeUsernameBody {
    new_username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody {
    new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePictureBody {
    new_picture: String,
}

#[derive(Serialize)]
struct Registered {
    #[serde(rename = "userID")]
    user_id: i64,
}

#[derive(Serialize)]
struct LoggedIn {
    #[serde(rename = "userID")]
    user_id: i64,
    token: String,
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Registered>), AppError> {
    let Json(body) = payload?;
    let user_id = state.auth.register(&body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(Registered { user_id })))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoggedIn>, AppError> {
    let Json(body) = payload?;
    match state.auth.login(&body.username, &body.password).await? {
        LoginOutcome::Success { user_id, token } => {
            tracing::info!("user {} logged in", body.username);
            Ok(Json(LoggedIn { user_id, token }))
        }
        LoginOutcome::InvalidCredentials => Err(AppError::Unauthorized),
    }
}

async fn logout(
    AuthGuard(user): AuthGuard,
    BearerToken(token): BearerToken,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&token).await?;
    tracing::info!("user {} logged out", user.username);
    Ok(StatusCode::NO_CONTENT)
}

async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let mut profile = state.ledger.profile(&username).await?;
    profile.picture = names::profile_picture_path(&profile.picture);
    Ok(Json(profile))
}

async fn top_players(State(state): State<AppState>) -> Result<Json<Vec<TopPlayer>>, AppError> {
    let players = state
        .auth
        .top_players()
        .await?
        .into_iter()
        .map(|mut player| {
            player.picture = names::profile_picture_path(&player.picture);
            player
        })
        .collect();
    Ok(Json(players))
}

async fn change_username(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<ChangeUsernameBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state.auth.change_username(&user, &body.new_username).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state.auth.change_password(&user, &body.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_picture(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    payload: Result<Json<ChangePictureBody>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = payload?;
    state.auth.change_picture(&user, &body.new_picture).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_account(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.auth.delete_account(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}
