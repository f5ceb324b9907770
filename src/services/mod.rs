pub mod auth;
pub mod category;
pub mod content;
pub mod gacha;
pub mod ledger;
pub mod quiz;

use std::future::Future;
use std::time::Duration;

use crate::error::Error;

/// Await a store call for at most `limit`. A timeout surfaces as
/// `UpstreamUnavailable`; store failures become `Internal`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = color_eyre::Result<T>>,
) -> Result<T, Error> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Error::Internal),
        Err(_) => Err(Error::UpstreamUnavailable(format!(
            "store did not answer within {}ms",
            limit.as_millis()
        ))),
    }
}
