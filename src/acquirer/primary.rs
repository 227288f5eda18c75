// Internal backend price endpoint, the authoritative tier.
use crate::acquirer::PriceProvider;
use crate::model::{AcquireError, PriceQuote, Tier};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PrimaryPayload {
    price_usd: Option<f64>,
    price_change_24h: Option<f64>,
}

pub struct PrimaryProvider {
    client: Client,
    base_url: String,
}

impl PrimaryProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn build_url(&self, entity_id: &str) -> String {
        format!("{}/api/crypto-price/{}", self.base_url.trim_end_matches('/'), entity_id)
    }
}

#[async_trait::async_trait]
impl PriceProvider for PrimaryProvider {
    async fn fetch(&self, entity_id: &str) -> Result<PriceQuote, AcquireError> {
        let response = self
            .client
            .get(self.build_url(entity_id))
            .send()
            .await
            .map_err(|e| AcquireError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AcquireError::BadStatus(response.status().as_u16()));
        }

        let payload: PrimaryPayload = response
            .json()
            .await
            .map_err(|e| AcquireError::Decode(e.to_string()))?;

        Ok(PriceQuote {
            symbol_id: entity_id.to_string(),
            price_usd: payload.price_usd,
            change_24h_pct: payload.price_change_24h,
            fetched_at: Utc::now(),
            tier: Tier::Primary,
        })
    }
}
