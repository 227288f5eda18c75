// Public CoinGecko-shaped endpoint, the best-effort tier.
use crate::acquirer::PriceProvider;
use crate::model::{AcquireError, PriceQuote, Tier};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct CoinEntry {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn build_url(&self, entity_id: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url.trim_end_matches('/'),
            entity_id
        )
    }
}

#[async_trait::async_trait]
impl PriceProvider for CoinGeckoProvider {
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

        // Payload is keyed by coin id: { "bitcoin": { "usd": ..., ... } }.
        let payload: HashMap<String, CoinEntry> = response
            .json()
            .await
            .map_err(|e| AcquireError::Decode(e.to_string()))?;

        quote_from_payload(entity_id, &payload)
    }
}

fn quote_from_payload(
    entity_id: &str,
    payload: &HashMap<String, CoinEntry>,
) -> Result<PriceQuote, AcquireError> {
    let entry = payload
        .get(entity_id)
        .ok_or_else(|| AcquireError::NotFound(entity_id.to_string()))?;

    Ok(PriceQuote {
        symbol_id: entity_id.to_string(),
        price_usd: entry.usd,
        change_24h_pct: entry.usd_24h_change,
        fetched_at: Utc::now(),
        tier: Tier::Fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> HashMap<String, CoinEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn keyed_payload_decodes_into_a_fallback_quote() {
        let payload = decode(r#"{ "bitcoin": { "usd": 50000.0, "usd_24h_change": 2.5 } }"#);
        let quote = quote_from_payload("bitcoin", &payload).unwrap();
        assert_eq!(quote.symbol_id, "bitcoin");
        assert_eq!(quote.price_usd, Some(50_000.0));
        assert_eq!(quote.change_24h_pct, Some(2.5));
        assert_eq!(quote.tier, Tier::Fallback);
    }

    #[test]
    fn missing_fields_decode_as_absent_not_zero() {
        let payload = decode(r#"{ "bitcoin": {} }"#);
        let quote = quote_from_payload("bitcoin", &payload).unwrap();
        assert_eq!(quote.price_usd, None);
        assert_eq!(quote.change_24h_pct, None);
    }

    #[test]
    fn absent_id_is_not_found() {
        let payload = decode(r#"{ "ethereum": { "usd": 1800.0 } }"#);
        let err = quote_from_payload("bitcoin", &payload).unwrap_err();
        assert!(matches!(err, AcquireError::NotFound(id) if id == "bitcoin"));
    }
}
