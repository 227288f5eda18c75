use serde::Deserialize;
use std::fs;

/// Keyword sets driving extraction and classification. Each list is a flat
/// bilingual set (English + Japanese) scanned in one pass. All lists can be
/// overridden from config.json; the defaults match the backend's vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_positive")]
    pub positive: Vec<String>,
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,
    #[serde(default = "default_buy")]
    pub buy: Vec<String>,
    #[serde(default = "default_sell")]
    pub sell: Vec<String>,
    #[serde(default = "default_bitcoin_terms")]
    pub bitcoin_terms: Vec<String>,
    #[serde(default = "default_ethereum_terms")]
    pub ethereum_terms: Vec<String>,
    #[serde(default = "default_defi_terms")]
    pub defi_terms: Vec<String>,
    #[serde(default = "default_regulation_terms")]
    pub regulation_terms: Vec<String>,
    #[serde(default = "default_technology_terms")]
    pub technology_terms: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            positive: default_positive(),
            negative: default_negative(),
            buy: default_buy(),
            sell: default_sell(),
            bitcoin_terms: default_bitcoin_terms(),
            ethereum_terms: default_ethereum_terms(),
            defi_terms: default_defi_terms(),
            regulation_terms: default_regulation_terms(),
            technology_terms: default_technology_terms(),
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_positive() -> Vec<String> {
    to_strings(&[
        "surge", "rally", "bullish", "growth", "adoption", "partnership",
        "upgrade", "launch", "success", "breakthrough", "positive", "gains",
        "上昇", "急騰", "強気", "高騰", "採用", "突破", "利益",
    ])
}

fn default_negative() -> Vec<String> {
    to_strings(&[
        "crash", "dump", "bearish", "decline", "hack", "ban", "vulnerability",
        "scam", "negative", "losses", "concerns",
        "下落", "暴落", "弱気", "クラッシュ", "損失",
    ])
}

fn default_buy() -> Vec<String> {
    to_strings(&["buy", "accumulate", "long", "買い"])
}

fn default_sell() -> Vec<String> {
    to_strings(&["sell", "short", "reduce", "売り"])
}

fn default_bitcoin_terms() -> Vec<String> {
    to_strings(&["bitcoin", "btc", "satoshi", "ビットコイン"])
}

fn default_ethereum_terms() -> Vec<String> {
    to_strings(&["ethereum", "eth", "vitalik", "eip", "merge", "staking", "イーサリアム"])
}

fn default_defi_terms() -> Vec<String> {
    to_strings(&[
        "defi", "decentralized finance", "yield", "liquidity",
        "uniswap", "aave", "compound",
    ])
}

fn default_regulation_terms() -> Vec<String> {
    to_strings(&["regulation", "sec", "cftc", "government", "ban", "legal", "compliance", "規制"])
}

fn default_technology_terms() -> Vec<String> {
    to_strings(&[
        "blockchain", "smart contract", "consensus", "mining", "node",
        "protocol", "ブロックチェーン",
    ])
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the internal backend (analysis, primary prices, news).
    pub backend_base_url: String,
    /// Base URL of the public fallback price API.
    #[serde(default = "default_fallback_base_url")]
    pub fallback_base_url: String,
    /// Coin ids watched by the price refresh task.
    pub symbols: Vec<String>,
    #[serde(default = "default_price_interval_ms")]
    pub price_interval_ms: u64,
    #[serde(default = "default_news_interval_ms")]
    pub news_interval_ms: u64,
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub keywords: KeywordConfig,
}

fn default_fallback_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_price_interval_ms() -> u64 {
    30_000
}

fn default_news_interval_ms() -> u64 {
    120_000
}

fn default_news_limit() -> usize {
    10
}

fn default_notification_ttl_ms() -> u64 {
    5_000
}

fn default_db_path() -> String {
    "data.db".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
