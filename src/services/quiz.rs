use std::time::Duration;

use color_eyre::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use ulid::Ulid;

use super::bounded;
use super::content::{Content, ContentSource};
use super::ledger::QuizReward;
use crate::db::models::{AuthUser, Quiz};
use crate::db::Db;
use crate::error::Error;
use crate::models::{CategorySelector, Question, Questions, Rarity};

// ---------------------------------------------------------------------------
// Store commands
// ---------------------------------------------------------------------------

/// One answer submission: advance `quiz_id` from `expected_index` to the
/// next question, crediting `reward` to the owner if this was the last one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizAdvance {
    pub quiz_id: String,
    pub user_id: i64,
    pub expected_index: u32,
    pub correct: bool,
    pub reward: Option<QuizReward>,
}

/// Spend one cheat sheet on the question at `expected_index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintRedemption {
    pub quiz_id: String,
    pub user_id: i64,
    pub expected_index: u32,
    pub rarity: Rarity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed,
    /// The user holds no cheat sheet of that rarity.
    OutOfStock,
    /// The quiz advanced or finished since it was read.
    QuizMoved,
}

// ---------------------------------------------------------------------------
// QuizRepository trait
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait QuizRepository: Send + Sync {
    fn active_quiz(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Quiz>>> + Send;

    fn quiz(&self, quiz_id: &str) -> impl std::future::Future<Output = Result<Option<Quiz>>> + Send;

    fn insert_quiz(&self, quiz: &Quiz) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn advance_quiz(
        &self,
        advance: &QuizAdvance,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn redeem_cheat_sheet(
        &self,
        redemption: &HintRedemption,
    ) -> impl std::future::Future<Output = Result<RedeemOutcome>> + Send;
}

impl QuizRepository for Db {
    async fn active_quiz(&self, user_id: i64) -> Result<Option<Quiz>> {
        Db::active_quiz(self, user_id).await
    }

    async fn quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        Db::quiz(self, quiz_id).await
    }

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<bool> {
        Db::insert_quiz(self, quiz).await
    }

    async fn advance_quiz(&self, advance: &QuizAdvance) -> Result<bool> {
        Db::advance_quiz(self, advance).await
    }

    async fn redeem_cheat_sheet(&self, redemption: &HintRedemption) -> Result<RedeemOutcome> {
        Db::redeem_cheat_sheet(self, redemption).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub finished: bool,
}

/// Shuffle the batch, keep the first `count` questions and shuffle the
/// responses of each kept question.
pub fn prepare_questions(
    mut batch: Questions,
    count: usize,
    order_rng: &mut impl Rng,
    responses_rng: &mut impl Rng,
) -> Questions {
    batch.shuffle(order_rng);
    batch.truncate(count);
    for question in &mut batch {
        question.responses.shuffle(responses_rng);
    }
    batch
}

/// Up to `count` wrong responses of `question`, in random order.
pub fn pick_hints(question: &Question, count: usize, rng: &mut impl Rng) -> Vec<String> {
    let mut wrong = question.incorrect_responses();
    wrong.shuffle(rng);
    wrong.truncate(count);
    wrong
}

fn check_owner(quiz: &Quiz, user: &AuthUser) -> Result<(), Error> {
    if quiz.user_id != user.id {
        tracing::warn!(
            "user_id={} tried to use quiz {} owned by user_id={}",
            user.id,
            quiz.id,
            quiz.user_id
        );
        return Err(Error::NotQuizOwner);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// QuizService
// ---------------------------------------------------------------------------

/// Quiz session lifecycle: creation, answering and hint redemption.
pub struct QuizService<R: QuizRepository = Db, C: ContentSource = Content> {
    repo: R,
    content: C,
    questions_per_quiz: usize,
    timeout: Duration,
}

impl<R: QuizRepository + Clone, C: ContentSource + Clone> Clone for QuizService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            content: self.content.clone(),
            questions_per_quiz: self.questions_per_quiz,
            timeout: self.timeout,
        }
    }
}

impl<R: QuizRepository, C: ContentSource> QuizService<R, C> {
    pub fn new(repo: R, content: C, questions_per_quiz: usize, timeout: Duration) -> Self {
        Self {
            repo,
            content,
            questions_per_quiz,
            timeout,
        }
    }

    /// Return the user's unfinished quiz, or build a new one from `selector`.
    pub async fn get_or_create_quiz(
        &self,
        user: &AuthUser,
        selector: &CategorySelector,
    ) -> Result<Quiz, Error> {
        if let Some(quiz) = bounded(self.timeout, self.repo.active_quiz(user.id)).await? {
            tracing::info!("resuming quiz {} for user_id={}", quiz.id, user.id);
            return Ok(quiz);
        }

        let batch = match tokio::time::timeout(
            self.timeout,
            self.content
                .fetch_batch(user.id, selector, self.questions_per_quiz),
        )
        .await
        {
            Ok(batch) => batch?,
            Err(_) => {
                return Err(Error::UpstreamUnavailable(
                    "question source timed out".to_string(),
                ))
            }
        };

        if batch.len() < self.questions_per_quiz {
            return Err(Error::InsufficientContent {
                available: batch.len(),
                required: self.questions_per_quiz,
            });
        }

        let questions = prepare_questions(
            batch,
            self.questions_per_quiz,
            &mut StdRng::from_entropy(),
            &mut StdRng::from_entropy(),
        );

        let quiz = Quiz {
            id: Ulid::new().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            questions,
            correct_count: 0,
            current_index: 0,
            finished: false,
        };

        if bounded(self.timeout, self.repo.insert_quiz(&quiz)).await? {
            return Ok(quiz);
        }

        // Lost a creation race against another request of the same user.
        bounded(self.timeout, self.repo.active_quiz(user.id))
            .await?
            .ok_or(Error::ConcurrentUpdate)
    }

    pub async fn get_quiz(&self, user: &AuthUser, quiz_id: &str) -> Result<Quiz, Error> {
        let quiz = self.load(quiz_id).await?;
        check_owner(&quiz, user)?;
        Ok(quiz)
    }

    /// Score `answer` against the current question and move to the next one.
    pub async fn submit_answer(
        &self,
        user: &AuthUser,
        quiz_id: &str,
        answer: &str,
    ) -> Result<AnswerOutcome, Error> {
        let quiz = self.load(quiz_id).await?;
        check_owner(&quiz, user)?;

        let Some(question) = quiz.current_question() else {
            return Err(Error::QuizAlreadyFinished);
        };

        let correct = question.is_correct(answer);
        let next_index = quiz.current_index + 1;
        let finished = next_index == quiz.question_count();
        let reward = finished.then(|| {
            QuizReward::for_result(
                quiz.correct_count + u32::from(correct),
                quiz.question_count(),
            )
        });

        let advance = QuizAdvance {
            quiz_id: quiz.id.clone(),
            user_id: quiz.user_id,
            expected_index: quiz.current_index,
            correct,
            reward,
        };

        if !bounded(self.timeout, self.repo.advance_quiz(&advance)).await? {
            return Err(self.moved_error(quiz_id).await);
        }

        tracing::info!(
            "answer recorded for quiz={quiz_id} question={}: correct={correct}",
            quiz.current_index
        );
        if let Some(reward) = reward {
            tracing::info!(
                "quiz {quiz_id} finished for user_id={}: {}/{} correct, coins=+{}",
                quiz.user_id,
                reward.correct_responses,
                quiz.question_count(),
                reward.coins
            );
        }

        Ok(AnswerOutcome { correct, finished })
    }

    /// Burn one cheat sheet of `tier` to reveal wrong responses of the
    /// current question. Tiers outside {3, 4, 5} reveal nothing and cost
    /// nothing.
    pub async fn redeem_hint(
        &self,
        user: &AuthUser,
        quiz_id: &str,
        tier: i64,
    ) -> Result<Vec<String>, Error> {
        let quiz = self.load(quiz_id).await?;
        check_owner(&quiz, user)?;

        let Some(question) = quiz.current_question() else {
            return Err(Error::QuizAlreadyFinished);
        };

        let Ok(rarity) = Rarity::try_from(tier) else {
            tracing::warn!("cheat sheet of unknown rarity {tier} requested for quiz={quiz_id}");
            return Ok(Vec::new());
        };

        let hints = pick_hints(question, rarity.hints(), &mut StdRng::from_entropy());

        let redemption = HintRedemption {
            quiz_id: quiz.id.clone(),
            user_id: user.id,
            expected_index: quiz.current_index,
            rarity,
        };

        match bounded(self.timeout, self.repo.redeem_cheat_sheet(&redemption)).await? {
            RedeemOutcome::Redeemed => {
                tracing::info!(
                    "cheat sheet rarity={tier} used on quiz={quiz_id} question={}: {} hints",
                    quiz.current_index,
                    hints.len()
                );
                Ok(hints)
            }
            RedeemOutcome::OutOfStock => Err(Error::InsufficientInventory(tier)),
            RedeemOutcome::QuizMoved => Err(self.moved_error(quiz_id).await),
        }
    }

    async fn load(&self, quiz_id: &str) -> Result<Quiz, Error> {
        bounded(self.timeout, self.repo.quiz(quiz_id))
            .await?
            .ok_or(Error::QuizNotFound)
    }

    /// Explain why a conditional update on `quiz_id` matched nothing.
    async fn moved_error(&self, quiz_id: &str) -> Error {
        match self.load(quiz_id).await {
            Ok(quiz) if quiz.finished => Error::QuizAlreadyFinished,
            Ok(_) => Error::ConcurrentUpdate,
            Err(e) => e,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
