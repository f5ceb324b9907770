use std::collections::HashSet;
use std::time::Duration;

use color_eyre::Result;

use super::bounded;
use crate::db::models::{AuthUser, Category};
use crate::db::Db;
use crate::error::Error;
use crate::models::Question;

#[cfg_attr(test, mockall::automock)]
pub trait CategoryRepository: Send + Sync {
    fn create_category(
        &self,
        user_id: i64,
        name: &str,
        questions: &[Question],
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn add_question(
        &self,
        user_id: i64,
        name: &str,
        question: &Question,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn categories(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Category>>> + Send;
}

impl CategoryRepository for Db {
    async fn create_category(&self, user_id: i64, name: &str, questions: &[Question]) -> Result<bool> {
        Db::create_category(self, user_id, name, questions).await
    }

    async fn add_question(&self, user_id: i64, name: &str, question: &Question) -> Result<bool> {
        Db::add_question(self, user_id, name, question).await
    }

    async fn categories(&self, user_id: i64) -> Result<Vec<Category>> {
        Db::categories(self, user_id).await
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("category name is empty".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository = Db> {
    repo: R,
    timeout: Duration,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    pub async fn create_category(
        &self,
        user: &AuthUser,
        name: &str,
        questions: &[Question],
    ) -> Result<(), Error> {
        validate_name(name)?;

        let mut texts = HashSet::new();
        for question in questions {
            question.validate().map_err(Error::Validation)?;
            if !texts.insert(question.question_text.as_str()) {
                return Err(Error::Validation(format!(
                    "question '{}' appears twice",
                    question.question_text
                )));
            }
        }

        if !bounded(
            self.timeout,
            self.repo.create_category(user.id, name, questions),
        )
        .await?
        {
            return Err(Error::CategoryExists(name.to_string()));
        }
        Ok(())
    }

    pub async fn add_question(
        &self,
        user: &AuthUser,
        name: &str,
        question: &Question,
    ) -> Result<(), Error> {
        validate_name(name)?;
        question.validate().map_err(Error::Validation)?;

        if !bounded(self.timeout, self.repo.add_question(user.id, name, question)).await? {
            return Err(Error::DuplicateQuestion(question.question_text.clone()));
        }
        Ok(())
    }

    pub async fn categories(&self, user: &AuthUser) -> Result<Vec<Category>, Error> {
        bounded(self.timeout, self.repo.categories(user.id)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn alice() -> AuthUser {
        AuthUser {
            id: 1,
            username: "alice".to_string(),
        }
    }

    fn question(text: &str) -> Question {
        Question {
            question_text: text.to_string(),
            responses: vec!["yes".to_string(), "no".to_string()],
            response_correct: "yes".to_string(),
            category: None,
        }
    }

    fn service(mock: MockCategoryRepository) -> CategoryService<MockCategoryRepository> {
        CategoryService::new(mock, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn create_category_stores_valid_questions() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_create_category()
            .withf(|user_id, name, questions| *user_id == 1 && name == "Rust" && questions.len() == 2)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(true) }));

        service(mock)
            .create_category(&alice(), "Rust", &[question("a?"), question("b?")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_existing_category_is_a_conflict() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_create_category()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));

        let err = service(mock)
            .create_category(&alice(), "Rust", &[question("a?")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CategoryExists(name) if name == "Rust"));
    }

    #[tokio::test]
    async fn duplicate_question_text_in_batch_is_invalid() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_create_category().never();

        let err = service(mock)
            .create_category(&alice(), "Rust", &[question("a?"), question("a?")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_question_is_invalid() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_add_question().never();
        let mut broken = question("a?");
        broken.response_correct = "maybe".to_string();

        let err = service(mock)
            .add_question(&alice(), "Rust", &broken)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn adding_existing_question_is_duplicate() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_add_question()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));

        let err = service(mock)
            .add_question(&alice(), "Rust", &question("a?"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateQuestion(_)));
    }
}
