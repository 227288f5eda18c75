// News feed acquisition with a deterministic offline fallback.
use crate::classifier::NewsClassifier;
use crate::model::NewsItem;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
struct RawNewsItem {
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    published: String,
    #[serde(default)]
    url: String,
}

pub struct NewsFeed {
    client: Client,
    base_url: String,
}

impl NewsFeed {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn build_url(&self, limit: usize) -> String {
        format!("{}/api/crypto-news?limit={}", self.base_url.trim_end_matches('/'), limit)
    }

    /// Total: a failed or malformed feed response substitutes the fixed local
    /// sample verbatim, so offline demos stay deterministic. Every returned
    /// item carries a derived category and sentiment.
    pub async fn fetch(&self, limit: usize, classifier: &NewsClassifier) -> Vec<NewsItem> {
        let raw = match self.fetch_remote(limit).await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                warn!("News feed returned no items, substituting local sample");
                sample_items()
            }
            Err(e) => {
                warn!("News feed unavailable ({}), substituting local sample", e);
                sample_items()
            }
        };

        raw.into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, item)| attach_classification(i, item, classifier))
            .collect()
    }

    async fn fetch_remote(&self, limit: usize) -> Result<Vec<RawNewsItem>, reqwest::Error> {
        let response = self
            .client
            .get(self.build_url(limit))
            .send()
            .await?
            .error_for_status()?;
        response.json().await
    }
}

fn attach_classification(index: usize, raw: RawNewsItem, classifier: &NewsClassifier) -> NewsItem {
    let (category, sentiment) = classifier.classify(&raw.title, &raw.summary);
    let id = if raw.url.is_empty() {
        format!("news-{}", index)
    } else {
        raw.url.clone()
    };
    NewsItem {
        id,
        title: raw.title,
        summary: raw.summary,
        source: raw.source,
        url: raw.url,
        published_at: parse_published(&raw.published),
        category,
        sentiment,
    }
}

fn parse_published(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Fixed sample used when the feed is unreachable. Content mirrors the
/// backend's own offline sample set.
fn sample_items() -> Vec<RawNewsItem> {
    vec![
        RawNewsItem {
            title: "Bitcoin価格が上昇傾向、機関投資家の関心高まる".to_string(),
            summary: "機関投資家のビットコインへの関心が高まっており、価格上昇要因となっている"
                .to_string(),
            source: "Sample Crypto News".to_string(),
            published: (Utc::now() - Duration::hours(2)).to_rfc3339(),
            url: "https://example.com/bitcoin-institutional-interest".to_string(),
        },
        RawNewsItem {
            title: "Ethereum 2.0アップデートが順調に進行".to_string(),
            summary: "Ethereum 2.0のアップグレードが計画通り進行し、ステーキング報酬が安定している"
                .to_string(),
            source: "Sample Tech News".to_string(),
            published: (Utc::now() - Duration::hours(4)).to_rfc3339(),
            url: "https://example.com/ethereum-upgrade".to_string(),
        },
        RawNewsItem {
            title: "DeFiプロトコルの総ロック資産価値が増加".to_string(),
            summary: "分散型金融プロトコルの総ロック資産価値が過去最高水準に達している".to_string(),
            source: "Sample DeFi News".to_string(),
            published: (Utc::now() - Duration::hours(6)).to_rfc3339(),
            url: "https://example.com/defi-tvl-increase".to_string(),
        },
    ]
}
