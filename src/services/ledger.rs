use std::time::Duration;

use color_eyre::Result;

use super::bounded;
use crate::db::models::Profile;
use crate::db::Db;
use crate::error::Error;
use crate::models::Rarity;
use crate::names;

/// What finishing a quiz is worth to its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizReward {
    pub coins: i64,
    pub experience: i64,
    pub correct_responses: i64,
    pub full_marks: bool,
}

impl QuizReward {
    pub fn for_result(correct: u32, total: u32) -> Self {
        let correct = i64::from(correct);
        Self {
            coins: names::BASE_COINS + names::COINS_PER_CORRECT * correct,
            experience: names::BASE_EXPERIENCE + correct,
            correct_responses: correct,
            full_marks: correct == i64::from(total),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait LedgerRepository: Send + Sync {
    fn profile(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>>> + Send;

    fn apply_quiz_completion(
        &self,
        user_id: i64,
        reward: &QuizReward,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn spend_currency(
        &self,
        user_id: i64,
        amount: i64,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn decrement_inventory(
        &self,
        user_id: i64,
        rarity: Rarity,
        amount: i64,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn increment_inventory(
        &self,
        user_id: i64,
        rarity: Rarity,
        amount: i64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl LedgerRepository for Db {
    async fn profile(&self, username: &str) -> Result<Option<Profile>> {
        Db::profile(self, username).await
    }

    async fn apply_quiz_completion(&self, user_id: i64, reward: &QuizReward) -> Result<()> {
        Db::apply_quiz_completion(self, user_id, reward).await
    }

    async fn spend_currency(&self, user_id: i64, amount: i64) -> Result<bool> {
        Db::spend_currency(self, user_id, amount).await
    }

    async fn decrement_inventory(&self, user_id: i64, rarity: Rarity, amount: i64) -> Result<bool> {
        Db::decrement_inventory(self, user_id, rarity, amount).await
    }

    async fn increment_inventory(&self, user_id: i64, rarity: Rarity, amount: i64) -> Result<()> {
        Db::increment_inventory(self, user_id, rarity, amount).await
    }
}

/// Currency, experience, cheat-sheet inventory and statistics of a user.
///
/// Quiz completion and gacha pulls do not go through here: they settle inside
/// their own store transactions (`Db::advance_quiz`, `Db::settle_pull`).
#[derive(Clone)]
pub struct LedgerService<R: LedgerRepository = Db> {
    repo: R,
    timeout: Duration,
}

impl<R: LedgerRepository> LedgerService<R> {
    pub fn new(repo: R, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    pub async fn profile(&self, username: &str) -> Result<Profile, Error> {
        bounded(self.timeout, self.repo.profile(username))
            .await?
            .ok_or(Error::UserNotFound)
    }

    pub async fn apply_quiz_completion(&self, user_id: i64, reward: &QuizReward) -> Result<(), Error> {
        bounded(self.timeout, self.repo.apply_quiz_completion(user_id, reward)).await
    }

    pub async fn spend_currency(&self, user_id: i64, amount: i64) -> Result<(), Error> {
        if amount < 0 {
            return Err(Error::Validation("cannot spend a negative amount".to_string()));
        }
        if bounded(self.timeout, self.repo.spend_currency(user_id, amount)).await? {
            Ok(())
        } else {
            Err(Error::InsufficientFunds { needed: amount })
        }
    }

    pub async fn decrement_inventory(
        &self,
        user_id: i64,
        rarity: Rarity,
        amount: i64,
    ) -> Result<(), Error> {
        if amount < 0 {
            return Err(Error::Validation("cannot remove a negative amount".to_string()));
        }
        if bounded(
            self.timeout,
            self.repo.decrement_inventory(user_id, rarity, amount),
        )
        .await?
        {
            Ok(())
        } else {
            Err(Error::InsufficientInventory(rarity.tier()))
        }
    }

    pub async fn increment_inventory(
        &self,
        user_id: i64,
        rarity: Rarity,
        amount: i64,
    ) -> Result<(), Error> {
        if amount < 0 {
            return Err(Error::Validation("cannot add a negative amount".to_string()));
        }
        bounded(
            self.timeout,
            self.repo.increment_inventory(user_id, rarity, amount),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(mock: MockLedgerRepository) -> LedgerService<MockLedgerRepository> {
        LedgerService::new(mock, Duration::from_secs(1))
    }

    #[test]
    fn reward_for_partial_score() {
        let reward = QuizReward::for_result(7, 10);
        assert_eq!(reward.coins, 170);
        assert_eq!(reward.experience, 17);
        assert_eq!(reward.correct_responses, 7);
        assert!(!reward.full_marks);
    }

    #[test]
    fn reward_for_full_marks() {
        let reward = QuizReward::for_result(10, 10);
        assert_eq!(reward.coins, 200);
        assert_eq!(reward.experience, 20);
        assert!(reward.full_marks);
    }

    #[test]
    fn reward_for_zero_score_still_pays_base() {
        let reward = QuizReward::for_result(0, 10);
        assert_eq!(reward.coins, 100);
        assert_eq!(reward.experience, 10);
        assert!(!reward.full_marks);
    }

    #[tokio::test]
    async fn spend_currency_short_balance_is_insufficient_funds() {
        let mut mock = MockLedgerRepository::new();
        mock.expect_spend_currency()
            .withf(|user_id, amount| *user_id == 1 && *amount == 900)
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let err = service(mock).spend_currency(1, 900).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { needed: 900 }));
    }

    #[tokio::test]
    async fn decrement_inventory_empty_stack_is_insufficient_inventory() {
        let mut mock = MockLedgerRepository::new();
        mock.expect_decrement_inventory()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));

        let err = service(mock)
            .decrement_inventory(1, Rarity::Rare, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientInventory(4)));
    }

    #[tokio::test]
    async fn negative_amounts_never_reach_the_store() {
        let mock = MockLedgerRepository::new();
        let svc = service(mock);

        assert!(matches!(
            svc.increment_inventory(1, Rarity::Common, -1).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            svc.spend_currency(1, -5).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_profile_is_not_found() {
        let mut mock = MockLedgerRepository::new();
        mock.expect_profile()
            .returning(|_| Box::pin(async { Ok(None) }));

        let err = service(mock).profile("ghost").await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound));
    }
}
