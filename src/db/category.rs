use color_eyre::{eyre::OptionExt, Result};
use libsql::params;

use super::helpers::{is_unique_violation, query_all};
use super::models::{Category, QuestionRow};
use super::Db;
use crate::models::{Question, Questions};

async fn insert_question(
    conn: &libsql::Connection,
    category_id: i64,
    question: &Question,
) -> Result<bool> {
    let responses = serde_json::to_string(&question.responses)?;
    let inserted = conn
        .execute(
            r#"
            INSERT INTO category_questions (category_id, question_text, responses, response_correct)
            VALUES (?, ?, ?, ?)
            "#,
            params![
                category_id,
                question.question_text.clone(),
                responses,
                question.response_correct.clone()
            ],
        )
        .await;

    match inserted {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl Db {
    /// Create a category with its initial questions. Returns `false` when the
    /// user already owns a category with that name.
    pub async fn create_category(
        &self,
        user_id: i64,
        name: &str,
        questions: &[Question],
    ) -> Result<bool> {
        let tx = self.begin_write().await?;

        let inserted = tx
            .query(
                "INSERT INTO categories (user_id, name) VALUES (?, ?) RETURNING id",
                params![user_id, name],
            )
            .await;
        let mut rows = match inserted {
            Ok(rows) => rows,
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let category_id = rows
            .next()
            .await?
            .ok_or_eyre("could not get category id")?
            .get::<i64>(0)?;
        drop(rows);

        for question in questions {
            color_eyre::eyre::ensure!(
                insert_question(&tx, category_id, question).await?,
                "duplicate question '{}' in new category",
                question.question_text
            );
        }

        tx.commit().await?;

        tracing::info!(
            "category '{name}' created for user_id={user_id} with {} questions",
            questions.len()
        );
        Ok(true)
    }

    /// Append a question, creating the category if needed. Returns `false`
    /// when the category already holds a question with the same text.
    pub async fn add_question(&self, user_id: i64, name: &str, question: &Question) -> Result<bool> {
        let tx = self.begin_write().await?;

        tx.execute(
            "INSERT INTO categories (user_id, name) VALUES (?, ?) ON CONFLICT(user_id, name) DO NOTHING",
            params![user_id, name],
        )
        .await?;

        let category_id = tx
            .query(
                "SELECT id FROM categories WHERE user_id = ? AND name = ?",
                params![user_id, name],
            )
            .await?
            .next()
            .await?
            .ok_or_eyre("category missing after insert")?
            .get::<i64>(0)?;

        if !insert_question(&tx, category_id, question).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        tracing::info!("question added to category '{name}' for user_id={user_id}");
        Ok(true)
    }

    /// Questions of a category owned by the user, `None` if there is no such
    /// category.
    pub async fn category_questions(&self, user_id: i64, name: &str) -> Result<Option<Questions>> {
        let conn = self.connect().await?;
        let category_id = conn
            .query(
                "SELECT id FROM categories WHERE user_id = ? AND name = ?",
                params![user_id, name],
            )
            .await?
            .next()
            .await?
            .map(|row| row.get::<i64>(0))
            .transpose()?;

        let Some(category_id) = category_id else {
            return Ok(None);
        };

        let questions = query_all::<QuestionRow>(
            &conn,
            "SELECT question_text, responses, response_correct FROM category_questions WHERE category_id = ? ORDER BY id",
            params![category_id],
        )
        .await?
        .into_iter()
        .map(|row| row.into_question(name))
        .collect::<Result<Questions>>()?;

        Ok(Some(questions))
    }

    pub async fn categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT name FROM categories WHERE user_id = ? ORDER BY name",
                params![user_id],
            )
            .await?;

        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        drop(rows);

        let mut categories = Vec::with_capacity(names.len());
        for name in names {
            let questions = self
                .category_questions(user_id, &name)
                .await?
                .unwrap_or_default();
            categories.push(Category { name, questions });
        }

        Ok(categories)
    }
}
