// Data acquisition: tiered price fetch, news feed, analysis requests.

pub mod analysis;
pub mod fallback;
pub mod news;
pub mod primary;

use crate::model::{AcquireError, PriceQuote};
use tracing::warn;

#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch(&self, entity_id: &str) -> Result<PriceQuote, AcquireError>;
}

/// Fetches a priced entity through an ordered two-tier provider chain.
///
/// The primary attempt strictly precedes the fallback; the tiers never run
/// in parallel so rate-limited providers are not double-charged. No retries
/// beyond the two tiers, no caching.
pub struct DataAcquirer {
    primary: Box<dyn PriceProvider>,
    fallback: Box<dyn PriceProvider>,
}

impl DataAcquirer {
    pub fn new(primary: Box<dyn PriceProvider>, fallback: Box<dyn PriceProvider>) -> Self {
        Self { primary, fallback }
    }

    pub async fn fetch(&self, entity_id: &str) -> Result<PriceQuote, AcquireError> {
        let primary_err = match self.primary.fetch(entity_id).await {
            Ok(quote) => return Ok(quote),
            Err(e) => {
                warn!("Primary price tier failed for {}: {}", entity_id, e);
                e
            }
        };

        match self.fallback.fetch(entity_id).await {
            Ok(quote) => Ok(quote),
            Err(fallback_err) => {
                warn!("Fallback price tier failed for {}: {}", entity_id, fallback_err);
                Err(AcquireError::AllTiersFailed {
                    primary: Box::new(primary_err),
                    fallback: Box::new(fallback_err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    struct FakeProvider {
        tier: Tier,
        price: Option<f64>,
        log: Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl PriceProvider for FakeProvider {
        async fn fetch(&self, entity_id: &str) -> Result<PriceQuote, AcquireError> {
            self.log.lock().unwrap().push(self.name);
            match self.price {
                Some(price) => Ok(PriceQuote {
                    symbol_id: entity_id.to_string(),
                    price_usd: Some(price),
                    change_24h_pct: Some(2.5),
                    fetched_at: Utc::now(),
                    tier: self.tier,
                }),
                None => Err(AcquireError::BadStatus(500)),
            }
        }
    }

    fn provider(
        tier: Tier,
        price: Option<f64>,
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Box<dyn PriceProvider> {
        Box::new(FakeProvider { tier, price, log: log.clone(), name })
    }

    #[tokio::test]
    async fn fallback_satisfies_request_when_primary_fails() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let acquirer = DataAcquirer::new(
            provider(Tier::Primary, None, "primary", &log),
            provider(Tier::Fallback, Some(50_000.0), "fallback", &log),
        );
        let quote = acquirer.fetch("bitcoin").await.unwrap();
        assert_eq!(quote.price_usd, Some(50_000.0));
        assert_eq!(quote.change_24h_pct, Some(2.5));
        assert_eq!(quote.tier, Tier::Fallback);
        assert_eq!(*log.lock().unwrap(), vec!["primary", "fallback"]);
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let acquirer = DataAcquirer::new(
            provider(Tier::Primary, Some(45_000.0), "primary", &log),
            provider(Tier::Fallback, Some(1.0), "fallback", &log),
        );
        let quote = acquirer.fetch("bitcoin").await.unwrap();
        assert_eq!(quote.tier, Tier::Primary);
        assert_eq!(*log.lock().unwrap(), vec!["primary"]);
    }

    #[tokio::test]
    async fn both_tiers_failing_surface_one_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let acquirer = DataAcquirer::new(
            provider(Tier::Primary, None, "primary", &log),
            provider(Tier::Fallback, None, "fallback", &log),
        );
        let err = acquirer.fetch("bitcoin").await.unwrap_err();
        assert!(matches!(err, AcquireError::AllTiersFailed { .. }));
    }
}
