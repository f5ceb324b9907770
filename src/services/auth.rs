use std::time::Duration;

use color_eyre::Result;
use rand::seq::SliceRandom;

use super::bounded;
use crate::db::models::{AuthUser, TopPlayer};
use crate::db::Db;
use crate::error::Error;
use crate::names;

// ---------------------------------------------------------------------------
// AuthRepository trait
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn username_exists(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_user(
        &self,
        username: &str,
        password: &str,
        picture: &str,
    ) -> impl std::future::Future<Output = Result<Option<i64>>> + Send;

    fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Option<i64>>> + Send;

    fn issue_token(&self, user_id: i64) -> impl std::future::Future<Output = Result<String>> + Send;

    fn clear_token(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    fn user_by_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<AuthUser>>> + Send;

    fn top_players(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<TopPlayer>>> + Send;

    fn update_username(
        &self,
        user_id: i64,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn update_password(
        &self,
        user_id: i64,
        password: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn update_picture(
        &self,
        user_id: i64,
        picture: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn delete_user(&self, user_id: i64) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl AuthRepository for Db {
    async fn username_exists(&self, username: &str) -> Result<bool> {
        Db::username_exists(self, username).await
    }

    async fn create_user(&self, username: &str, password: &str, picture: &str) -> Result<Option<i64>> {
        Db::create_user(self, username, password, picture).await
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<i64>> {
        Db::verify_credentials(self, username, password).await
    }

    async fn issue_token(&self, user_id: i64) -> Result<String> {
        Db::issue_token(self, user_id).await
    }

    async fn clear_token(&self, token: &str) -> Result<()> {
        Db::clear_token(self, token).await
    }

    async fn user_by_token(&self, token: &str) -> Result<Option<AuthUser>> {
        Db::user_by_token(self, token).await
    }

    async fn top_players(&self, limit: u32) -> Result<Vec<TopPlayer>> {
        Db::top_players(self, limit).await
    }

    async fn update_username(&self, user_id: i64, username: &str) -> Result<bool> {
        Db::update_username(self, user_id, username).await
    }

    async fn update_password(&self, user_id: i64, password: &str) -> Result<()> {
        Db::update_password(self, user_id, password).await
    }

    async fn update_picture(&self, user_id: i64, picture: &str) -> Result<()> {
        Db::update_picture(self, user_id, picture).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        Db::delete_user(self, user_id).await
    }
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Login succeeded with a fresh session token.
    Success { user_id: i64, token: String },
    /// Wrong password or unknown username.
    InvalidCredentials,
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AuthService<R: AuthRepository = Db> {
    repo: R,
    timeout: Duration,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: R, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    /// Create an account with an empty ledger and a random profile picture.
    pub async fn register(&self, username: &str, password: &str) -> Result<i64, Error> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "username and password are required".to_string(),
            ));
        }

        check_password_strength(password)?;

        if bounded(self.timeout, self.repo.username_exists(username)).await? {
            return Err(Error::UsernameTaken(username.to_string()));
        }

        let picture = names::PROFILE_PICTURES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("default");

        // A concurrent registration may still win the unique index.
        bounded(
            self.timeout,
            self.repo.create_user(username, password, picture),
        )
        .await?
        .ok_or_else(|| Error::UsernameTaken(username.to_string()))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, Error> {
        let Some(user_id) = bounded(
            self.timeout,
            self.repo.verify_credentials(username, password),
        )
        .await?
        else {
            tracing::warn!("failed login attempt for username={username}");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let token = bounded(self.timeout, self.repo.issue_token(user_id)).await?;
        Ok(LoginOutcome::Success { user_id, token })
    }

    pub async fn logout(&self, token: &str) -> Result<(), Error> {
        bounded(self.timeout, self.repo.clear_token(token)).await
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, Error> {
        bounded(self.timeout, self.repo.user_by_token(token)).await
    }

    pub async fn top_players(&self) -> Result<Vec<TopPlayer>, Error> {
        bounded(
            self.timeout,
            self.repo.top_players(names::TOP_PLAYERS_LIMIT),
        )
        .await
    }

    pub async fn change_username(&self, user: &AuthUser, new_username: &str) -> Result<(), Error> {
        if new_username.trim().is_empty() {
            return Err(Error::Validation("newUsername is required".to_string()));
        }

        if bounded(
            self.timeout,
            self.repo.update_username(user.id, new_username),
        )
        .await?
        {
            Ok(())
        } else {
            Err(Error::UsernameTaken(new_username.to_string()))
        }
    }

    pub async fn change_password(&self, user: &AuthUser, new_password: &str) -> Result<(), Error> {
        check_password_strength(new_password)?;
        bounded(
            self.timeout,
            self.repo.update_password(user.id, new_password),
        )
        .await
    }

    /// Switch to another picture from the fixed set.
    pub async fn change_picture(&self, user: &AuthUser, picture: &str) -> Result<(), Error> {
        if !names::PROFILE_PICTURES.contains(&picture) {
            return Err(Error::Validation(format!("unknown picture '{picture}'")));
        }
        bounded(self.timeout, self.repo.update_picture(user.id, picture)).await
    }

    pub async fn delete_account(&self, user: &AuthUser) -> Result<(), Error> {
        bounded(self.timeout, self.repo.delete_user(user.id)).await?;
        tracing::info!("account closed: {}", user.username);
        Ok(())
    }
}

fn check_password_strength(password: &str) -> Result<(), Error> {
    if password.len() < names::MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "password must be at least {} characters",
            names::MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
