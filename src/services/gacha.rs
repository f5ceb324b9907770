use std::time::Duration;

use color_eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::bounded;
use crate::db::models::AuthUser;
use crate::db::Db;
use crate::error::Error;
use crate::models::Rarity;
use crate::names;

/// Coins charged for `quantity` pulls. Ten at once are discounted.
pub fn price_for(quantity: u32) -> Result<i64, Error> {
    match quantity {
        0 => Err(Error::Validation("pull quantity must be at least 1".to_string())),
        names::MULTI_PULL_SIZE => Ok(names::MULTI_PULL_PRICE),
        n if n <= names::MAX_PULL_QUANTITY => Ok(names::SINGLE_PULL_PRICE * i64::from(n)),
        n => Err(Error::Validation(format!(
            "pull quantity must be at most {}, got {n}",
            names::MAX_PULL_QUANTITY
        ))),
    }
}

/// Map a uniform draw in `[0, 1)` to a rarity.
pub fn draw_rarity(v: f64) -> Rarity {
    if v <= names::LEGENDARY_THRESHOLD {
        Rarity::Legendary
    } else if v <= names::RARE_THRESHOLD {
        Rarity::Rare
    } else {
        Rarity::Common
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait GachaRepository: Send + Sync {
    /// Charge `price` and add one cheat sheet per entry of `rarities`, all or
    /// nothing. `false` means the balance was too low.
    fn settle_pull(
        &self,
        user_id: i64,
        price: i64,
        rarities: &[Rarity],
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl GachaRepository for Db {
    async fn settle_pull(&self, user_id: i64, price: i64, rarities: &[Rarity]) -> Result<bool> {
        Db::settle_pull(self, user_id, price, rarities).await
    }
}

#[derive(Clone)]
pub struct GachaService<R: GachaRepository = Db> {
    repo: R,
    timeout: Duration,
}

impl<R: GachaRepository> GachaService<R> {
    pub fn new(repo: R, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    pub async fn pull(&self, user: &AuthUser, quantity: u32) -> Result<Vec<Rarity>, Error> {
        self.pull_with_rng(user, quantity, &mut StdRng::from_entropy())
            .await
    }

    /// Draw `quantity` rarities and settle them against the user's coins.
    /// Nothing is granted when the user cannot pay.
    pub async fn pull_with_rng(
        &self,
        user: &AuthUser,
        quantity: u32,
        rng: &mut (impl Rng + Send),
    ) -> Result<Vec<Rarity>, Error> {
        let price = price_for(quantity)?;
        let rarities: Vec<Rarity> = (0..quantity)
            .map(|_| draw_rarity(rng.gen::<f64>()))
            .collect();

        if !bounded(self.timeout, self.repo.settle_pull(user.id, price, &rarities)).await? {
            return Err(Error::InsufficientFunds { needed: price });
        }

        tracing::info!(
            "user_id={} pulled {quantity} cheat sheets for {price} coins: {:?}",
            user.id,
            rarities.iter().map(|r| r.tier()).collect::<Vec<_>>()
        );
        Ok(rarities)
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

    #[test]
    fn prices_follow_the_discount_rule() {
        assert_eq!(price_for(1).unwrap(), 100);
        assert_eq!(price_for(3).unwrap(), 300);
        assert_eq!(price_for(9).unwrap(), 900);
        assert_eq!(price_for(10).unwrap(), 900);
        assert!(matches!(price_for(0), Err(Error::Validation(_))));
        assert!(matches!(price_for(11), Err(Error::Validation(_))));
    }

    #[test]
    fn draw_thresholds_are_inclusive() {
        assert_eq!(draw_rarity(0.0), Rarity::Legendary);
        assert_eq!(draw_rarity(0.05), Rarity::Legendary);
        assert_eq!(draw_rarity(0.051), Rarity::Rare);
        assert_eq!(draw_rarity(0.20), Rarity::Rare);
        assert_eq!(draw_rarity(0.21), Rarity::Common);
        assert_eq!(draw_rarity(0.99), Rarity::Common);
    }

    #[test]
    fn draw_distribution_is_roughly_five_fifteen_eighty() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            match draw_rarity(rng.gen::<f64>()) {
                Rarity::Legendary => counts[0] += 1,
                Rarity::Rare => counts[1] += 1,
                Rarity::Common => counts[2] += 1,
            }
        }
        let share = |n: usize| n as f64 / draws as f64;
        assert!((share(counts[0]) - 0.05).abs() < 0.01);
        assert!((share(counts[1]) - 0.15).abs() < 0.01);
        assert!((share(counts[2]) - 0.80).abs() < 0.01);
    }

    #[tokio::test]
    async fn ten_pull_charges_discounted_price() {
        let mut mock = MockGachaRepository::new();
        mock.expect_settle_pull()
            .withf(|user_id, price, rarities| *user_id == 1 && *price == 900 && rarities.len() == 10)
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(true) }));

        let pulled = GachaService::new(mock, Duration::from_secs(1))
            .pull_with_rng(&alice(), 10, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();

        assert_eq!(pulled.len(), 10);
    }

    #[tokio::test]
    async fn short_balance_is_insufficient_funds() {
        let mut mock = MockGachaRepository::new();
        mock.expect_settle_pull()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));

        let err = GachaService::new(mock, Duration::from_secs(1))
            .pull(&alice(), 10)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { needed: 900 }));
    }

    #[tokio::test]
    async fn invalid_quantity_never_reaches_the_store() {
        let mut mock = MockGachaRepository::new();
        mock.expect_settle_pull().never();

        let err = GachaService::new(mock, Duration::from_secs(1))
            .pull(&alice(), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }
}
