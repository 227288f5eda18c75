// Core structs shared across the acquisition and interpretation layer.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw analysis text as returned by the backend, opaque until extraction.
#[derive(Debug, Clone)]
pub struct AnalysisDocument {
    pub raw_text: String,
}

impl AnalysisDocument {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self { raw_text: raw_text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Neutral,
    Positive,
    Negative,
}

/// A single displayable metric derived from analysis text. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub classification: Classification,
}

/// One titled segment of an analysis document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub body_fragments: Vec<String>,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bitcoin,
    Ethereum,
    Defi,
    Regulation,
    Technology,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// News item as shown to the views. `category` and `sentiment` are attached
/// by the classifier; everything else arrives from the source verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub category: Category,
    pub sentiment: Sentiment,
}

/// Which provider satisfied a price request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub symbol_id: String,
    pub price_usd: Option<f64>,
    pub change_24h_pct: Option<f64>,
    pub fetched_at: DateTime<Utc>,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "above" => Some(AlertCondition::Above),
            "below" => Some(AlertCondition::Below),
            _ => None,
        }
    }
}

/// User-defined price alert, durable across restarts.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: i64,
    pub symbol_id: String,
    pub condition: AlertCondition,
    pub threshold_price: f64,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// Unvalidated user input for a new alert.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertDraft {
    pub symbol_id: String,
    pub condition: AlertCondition,
    pub threshold_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-facing message, owned by the notification center.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub ttl_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Quick,
    Standard,
    Deep,
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("bad status: {0}")]
    BadStatus(u16),

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("entity not found in provider response: {0}")]
    NotFound(String),

    #[error("backend rejected the request: {0}")]
    Backend(String),

    #[error("all tiers failed (primary: {primary}, fallback: {fallback})")]
    AllTiersFailed {
        primary: Box<AcquireError>,
        fallback: Box<AcquireError>,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("alert symbol must not be empty")]
    MissingSymbol,

    #[error("alert threshold price must be positive")]
    NonPositiveThreshold,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
