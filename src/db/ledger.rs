// Reward ledger mutations. Every change is a single conditional UPDATE so
// that balances are never read and written back from application code.

use color_eyre::{eyre::ensure, Result};
use libsql::params;

use super::Db;
use crate::models::Rarity;
use crate::services::ledger::QuizReward;

pub(super) async fn credit_completion(
    conn: &libsql::Connection,
    user_id: i64,
    reward: &QuizReward,
) -> Result<()> {
    let affected = conn
        .execute(
            r#"
            UPDATE users SET
                coins = coins + ?,
                experience = experience + ?,
                quizzes_played = quizzes_played + 1,
                correct_responses = correct_responses + ?,
                full_marks = full_marks + ?
            WHERE id = ?
            "#,
            params![
                reward.coins,
                reward.experience,
                reward.correct_responses,
                i64::from(reward.full_marks),
                user_id
            ],
        )
        .await?;

    ensure!(affected == 1, "user {user_id} vanished while crediting a quiz");
    Ok(())
}

/// Returns `false` without touching the balance when it is below `amount`.
pub(super) async fn debit_coins(conn: &libsql::Connection, user_id: i64, amount: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE users SET coins = coins - ?1 WHERE id = ?2 AND coins >= ?1",
            params![amount, user_id],
        )
        .await?;
    Ok(affected == 1)
}

/// Returns `false` without touching the stack when it holds fewer than `amount`.
pub(super) async fn take_cheat_sheets(
    conn: &libsql::Connection,
    user_id: i64,
    rarity: Rarity,
    amount: i64,
) -> Result<bool> {
    let affected = conn
        .execute(
            r#"
            UPDATE inventory SET quantity = quantity - ?1
            WHERE user_id = ?2 AND rarity = ?3 AND quantity >= ?1
            "#,
            params![amount, user_id, rarity.tier()],
        )
        .await?;
    Ok(affected == 1)
}

pub(super) async fn add_cheat_sheets(
    conn: &libsql::Connection,
    user_id: i64,
    rarity: Rarity,
    amount: i64,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO inventory (user_id, rarity, quantity) VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, rarity) DO UPDATE SET quantity = quantity + excluded.quantity
        "#,
        params![user_id, rarity.tier(), amount],
    )
    .await?;
    Ok(())
}

impl Db {
    pub async fn apply_quiz_completion(&self, user_id: i64, reward: &QuizReward) -> Result<()> {
        let conn = self.connect().await?;
        credit_completion(&conn, user_id, reward).await?;
        tracing::info!(
            "quiz reward applied for user_id={user_id}: coins=+{}, experience=+{}",
            reward.coins,
            reward.experience
        );
        Ok(())
    }

    pub async fn spend_currency(&self, user_id: i64, amount: i64) -> Result<bool> {
        let conn = self.connect().await?;
        debit_coins(&conn, user_id, amount).await
    }

    pub async fn decrement_inventory(&self, user_id: i64, rarity: Rarity, amount: i64) -> Result<bool> {
        let conn = self.connect().await?;
        take_cheat_sheets(&conn, user_id, rarity, amount).await
    }

    pub async fn increment_inventory(&self, user_id: i64, rarity: Rarity, amount: i64) -> Result<()> {
        let conn = self.connect().await?;
        add_cheat_sheets(&conn, user_id, rarity, amount).await
    }

    /// Debit `price` and add every drawn cheat sheet in one transaction.
    /// Returns `false`, with nothing changed, when the balance is short.
    pub async fn settle_pull(&self, user_id: i64, price: i64, draws: &[Rarity]) -> Result<bool> {
        let tx = self.begin_write().await?;

        if !debit_coins(&tx, user_id, price).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        for rarity in Rarity::ALL {
            let count = draws.iter().filter(|&&drawn| drawn == rarity).count() as i64;
            if count > 0 {
                add_cheat_sheets(&tx, user_id, rarity, count).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "gacha pull settled for user_id={user_id}: price={price}, draws={}",
            draws.len()
        );
        Ok(true)
    }
}
