use crate::content::TriviaClient;
use crate::db::Db;
use crate::error::Error;
use crate::models::{CategorySelector, QuestionSource, Questions};

/// Supplies candidate questions for a new quiz.
#[cfg_attr(test, mockall::automock)]
pub trait ContentSource: Send + Sync {
    /// At least `amount` questions when the source has that many; fewer
    /// otherwise. The caller decides whether the batch is large enough.
    fn fetch_batch(
        &self,
        user_id: i64,
        selector: &CategorySelector,
        amount: usize,
    ) -> impl std::future::Future<Output = Result<Questions, Error>> + Send;
}

/// Questions from the user's own categories or from the trivia provider.
#[derive(Clone)]
pub struct Content {
    bank: Db,
    trivia: TriviaClient,
}

impl Content {
    pub fn new(bank: Db, trivia: TriviaClient) -> Self {
        Self { bank, trivia }
    }
}

impl ContentSource for Content {
    async fn fetch_batch(
        &self,
        user_id: i64,
        selector: &CategorySelector,
        amount: usize,
    ) -> Result<Questions, Error> {
        match selector.source {
            QuestionSource::Bank => self
                .bank
                .category_questions(user_id, &selector.name)
                .await?
                .ok_or_else(|| Error::CategoryNotFound(selector.name.clone())),
            QuestionSource::Trivia => self.trivia.fetch(&selector.name, amount).await,
        }
    }
}
