use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use color_eyre::{eyre::OptionExt, Result};
use libsql::params;
use ulid::Ulid;

use super::helpers::{is_unique_violation, query_all, query_optional};
use super::models::{AuthUser, CheatSheetStack, CredentialsRow, Profile, ProfileRow, TopPlayer};
use super::Db;
use crate::models::Rarity;

impl Db {
    /// Create a user with an empty ledger. Returns `None` when the username
    /// is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        picture: &str,
    ) -> Result<Option<i64>> {
        let password_hash = hash_password(password)?;
        let tx = self.begin_write().await?;

        let inserted = tx
            .query(
                "INSERT INTO users (username, password_hash, picture) VALUES (?, ?, ?) RETURNING id",
                params![username, password_hash, picture],
            )
            .await;
        let mut rows = match inserted {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => {
                tracing::info!("username already taken: {username}");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let user_id = rows
            .next()
            .await?
            .ok_or_eyre("could not get user id")?
            .get::<i64>(0)?;
        drop(rows);

        for rarity in Rarity::ALL {
            tx.execute(
                "INSERT INTO inventory (user_id, rarity, quantity) VALUES (?, ?, 0)",
                params![user_id, rarity.tier()],
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!("new user created: id={user_id}, username={username}");
        Ok(Some(user_id))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.connect().await?;
        let row = conn
            .query("SELECT 1 FROM users WHERE username = ?", params![username])
            .await?
            .next()
            .await?;
        Ok(row.is_some())
    }

    /// Check a username/password pair, returning the user id on success.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<i64>> {
        let conn = self.connect().await?;
        let row = query_optional::<CredentialsRow>(
            &conn,
            "SELECT id, password_hash FROM users WHERE username = ?",
            params![username],
        )
        .await?;

        Ok(row.and_then(|row| verify_password(password, &row.password_hash).then_some(row.id)))
    }

    /// Rotate the user's session token.
    pub async fn issue_token(&self, user_id: i64) -> Result<String> {
        let token = Ulid::new().to_string();
        let conn = self.connect().await?;
        conn.execute(
            "UPDATE users SET token = ? WHERE id = ?",
            params![token.clone(), user_id],
        )
        .await?;

        tracing::info!("new session token issued for user_id={user_id}");
        Ok(token)
    }

    pub async fn clear_token(&self, token: &str) -> Result<()> {
        let conn = self.connect().await?;
        conn.execute("UPDATE users SET token = NULL WHERE token = ?", params![token])
            .await?;
        Ok(())
    }

    /// Rename a user. Returns `false` when the new username is taken.
    pub async fn update_username(&self, user_id: i64, username: &str) -> Result<bool> {
        let conn = self.connect().await?;
        let updated = conn
            .execute(
                "UPDATE users SET username = ? WHERE id = ?",
                params![username, user_id],
            )
            .await;

        match updated {
            Ok(_) => {
                tracing::info!("user_id={user_id} renamed to {username}");
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the password hash. Existing sessions stay valid.
    pub async fn update_password(&self, user_id: i64, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;
        let conn = self.connect().await?;
        conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            params![password_hash, user_id],
        )
        .await?;

        tracing::info!("password changed for user_id={user_id}");
        Ok(())
    }

    pub async fn update_picture(&self, user_id: i64, picture: &str) -> Result<()> {
        let conn = self.connect().await?;
        conn.execute(
            "UPDATE users SET picture = ? WHERE id = ?",
            params![picture, user_id],
        )
        .await?;
        Ok(())
    }

    /// Delete a user. Inventory, categories and quizzes go with it through
    /// the foreign keys.
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        let conn = self.connect().await?;
        conn.execute("DELETE FROM users WHERE id = ?", params![user_id])
            .await?;

        tracing::info!("user deleted: id={user_id}");
        Ok(())
    }

    pub async fn user_by_token(&self, token: &str) -> Result<Option<AuthUser>> {
        let conn = self.connect().await?;
        query_optional(
            &conn,
            "SELECT id, username FROM users WHERE token = ?",
            params![token],
        )
        .await
    }

    pub async fn profile(&self, username: &str) -> Result<Option<Profile>> {
        let conn = self.connect().await?;
        let profile = query_optional::<ProfileRow>(
            &conn,
            r#"
            SELECT id, username, picture, coins, experience,
                   quizzes_played, correct_responses, full_marks, used_cheat_sheets
            FROM users WHERE username = ?
            "#,
            params![username],
        )
        .await?
        .map(Profile::from);

        let Some(mut profile) = profile else {
            return Ok(None);
        };

        profile.inventory = query_all::<CheatSheetStack>(
            &conn,
            "SELECT rarity, quantity FROM inventory WHERE user_id = ? ORDER BY rarity",
            params![profile.id],
        )
        .await?;

        Ok(Some(profile))
    }

    pub async fn top_players(&self, limit: u32) -> Result<Vec<TopPlayer>> {
        let conn = self.connect().await?;
        query_all(
            &conn,
            "SELECT username, experience, picture FROM users ORDER BY experience DESC, id ASC LIMIT ?",
            params![i64::from(limit)],
        )
        .await
    }
}

/// Run argon2 hashing on a dedicated thread with a large stack to avoid
/// stack overflow in debug builds.
fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024) // 4 MB stack
        .spawn(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| color_eyre::eyre::eyre!("failed to hash password: {e}"))
        })?
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("hash thread panicked"))?
}

fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(move || {
            let parsed_hash = match PasswordHash::new(&hash) {
                Ok(h) => h,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .map(|h| h.join().unwrap_or(false))
        .unwrap_or(false)
}
