use color_eyre::Result;
use libsql::params;

use super::helpers::{is_unique_violation, query_optional};
use super::ledger;
use super::models::{Quiz, QuizRow};
use super::Db;
use crate::services::quiz::{HintRedemption, QuizAdvance, RedeemOutcome};

const QUIZ_COLUMNS: &str = r#"
    q.id AS id, q.user_id AS user_id, u.username AS username, q.questions AS questions,
    q.correct_count AS correct_count, q.current_index AS current_index, q.finished AS finished
    FROM quizzes q JOIN users u ON u.id = q.user_id
"#;

impl Db {
    pub async fn active_quiz(&self, user_id: i64) -> Result<Option<Quiz>> {
        let conn = self.connect().await?;
        query_optional::<QuizRow>(
            &conn,
            &format!("SELECT {QUIZ_COLUMNS} WHERE q.user_id = ? AND q.finished = 0"),
            params![user_id],
        )
        .await?
        .map(Quiz::try_from)
        .transpose()
    }

    pub async fn quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        let conn = self.connect().await?;
        query_optional::<QuizRow>(
            &conn,
            &format!("SELECT {QUIZ_COLUMNS} WHERE q.id = ?"),
            params![quiz_id],
        )
        .await?
        .map(Quiz::try_from)
        .transpose()
    }

    /// Persist a fresh quiz. Returns `false` when the user already has an
    /// unfinished quiz; the partial unique index decides concurrent inserts.
    pub async fn insert_quiz(&self, quiz: &Quiz) -> Result<bool> {
        let questions = serde_json::to_string(&quiz.questions)?;
        let conn = self.connect().await?;

        let inserted = conn
            .execute(
                r#"
                INSERT INTO quizzes (id, user_id, questions, question_count, current_index, correct_count, finished)
                VALUES (?, ?, ?, ?, 0, 0, 0)
                "#,
                params![
                    quiz.id.clone(),
                    quiz.user_id,
                    questions,
                    i64::from(quiz.question_count())
                ],
            )
            .await;

        match inserted {
            Ok(_) => {
                tracing::info!(
                    "new quiz created with id: {} for user_id: {}",
                    quiz.id,
                    quiz.user_id
                );
                Ok(true)
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!("user_id={} already has an active quiz", quiz.user_id);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Move the quiz cursor forward by one, only if it still points at
    /// `expected_index`. When the step finishes the quiz the owner's reward
    /// is credited in the same transaction. Returns `false` if another
    /// submission got there first.
    pub async fn advance_quiz(&self, advance: &QuizAdvance) -> Result<bool> {
        let tx = self.begin_write().await?;

        let affected = tx
            .execute(
                r#"
                UPDATE quizzes SET
                    current_index = current_index + 1,
                    correct_count = correct_count + ?1,
                    finished = (current_index + 1 = question_count)
                WHERE id = ?2 AND current_index = ?3 AND finished = 0
                "#,
                params![
                    i64::from(advance.correct),
                    advance.quiz_id.clone(),
                    i64::from(advance.expected_index)
                ],
            )
            .await?;

        if affected == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(reward) = &advance.reward {
            ledger::credit_completion(&tx, advance.user_id, reward).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Consume one cheat sheet for the question the quiz is currently on.
    pub async fn redeem_cheat_sheet(&self, redemption: &HintRedemption) -> Result<RedeemOutcome> {
        let tx = self.begin_write().await?;

        let current_index = tx
            .query(
                "SELECT current_index FROM quizzes WHERE id = ? AND finished = 0",
                params![redemption.quiz_id.clone()],
            )
            .await?
            .next()
            .await?
            .map(|row| row.get::<i64>(0))
            .transpose()?;

        if current_index != Some(i64::from(redemption.expected_index)) {
            tx.rollback().await?;
            return Ok(RedeemOutcome::QuizMoved);
        }

        if !ledger::take_cheat_sheets(&tx, redemption.user_id, redemption.rarity, 1).await? {
            tx.rollback().await?;
            return Ok(RedeemOutcome::OutOfStock);
        }

        tx.execute(
            "UPDATE users SET used_cheat_sheets = used_cheat_sheets + 1 WHERE id = ?",
            params![redemption.user_id],
        )
        .await?;

        tx.commit().await?;
        Ok(RedeemOutcome::Redeemed)
    }
}
