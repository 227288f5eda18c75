// Metric extraction from raw analysis text.
use crate::config::KeywordConfig;
use crate::model::{Classification, Metric};
use regex::Regex;

/// A single extraction rule: a matcher run once over the full document.
/// Rules are independent; each may or may not yield a metric.
struct Rule {
    apply: Box<dyn Fn(&str) -> Option<Metric> + Send + Sync>,
}

/// Pulls known metric shapes out of analysis text. Total: absence of a
/// pattern omits or defaults the metric, never fails.
///
/// Output order is fixed: price, 24h change, sentiment, recommendation.
/// Sentiment and recommendation always default when no keyword matches.
pub struct MetricExtractor {
    rules: Vec<Rule>,
}

impl MetricExtractor {
    pub fn new(keywords: &KeywordConfig) -> Self {
        let price_re = Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d+)?")
            .expect("price pattern is static");
        let percent_re = Regex::new(r"[+-]?\d+(?:\.\d+)?%")
            .expect("percent pattern is static");

        let positive = lowercase_all(&keywords.positive);
        let negative = lowercase_all(&keywords.negative);
        let buy = lowercase_all(&keywords.buy);
        let sell = lowercase_all(&keywords.sell);

        let rules = vec![
            Rule {
                apply: Box::new(move |text| {
                    price_re.find(text).map(|m| Metric {
                        label: "Current Price".to_string(),
                        value: m.as_str().to_string(),
                        classification: Classification::Neutral,
                    })
                }),
            },
            Rule {
                apply: Box::new(move |text| {
                    percent_re.find(text).map(|m| {
                        let parsed: f64 = m
                            .as_str()
                            .trim_end_matches('%')
                            .parse()
                            .unwrap_or(0.0);
                        Metric {
                            label: "24h Change".to_string(),
                            value: m.as_str().to_string(),
                            classification: if parsed >= 0.0 {
                                Classification::Positive
                            } else {
                                Classification::Negative
                            },
                        }
                    })
                }),
            },
            Rule {
                apply: Box::new(move |text| {
                    let lower = text.to_lowercase();
                    let (value, classification) = if contains_any(&lower, &positive) {
                        ("positive", Classification::Positive)
                    } else if contains_any(&lower, &negative) {
                        ("negative", Classification::Negative)
                    } else {
                        ("neutral", Classification::Neutral)
                    };
                    Some(Metric {
                        label: "Sentiment".to_string(),
                        value: value.to_string(),
                        classification,
                    })
                }),
            },
            Rule {
                apply: Box::new(move |text| {
                    let lower = text.to_lowercase();
                    let (value, classification) = if contains_any(&lower, &buy) {
                        ("buy", Classification::Positive)
                    } else if contains_any(&lower, &sell) {
                        ("sell", Classification::Negative)
                    } else {
                        ("hold", Classification::Neutral)
                    };
                    Some(Metric {
                        label: "Recommendation".to_string(),
                        value: value.to_string(),
                        classification,
                    })
                }),
            },
        ];

        Self { rules }
    }

    pub fn extract(&self, raw_text: &str) -> Vec<Metric> {
        self.rules.iter().filter_map(|rule| (rule.apply)(raw_text)).collect()
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn contains_any(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| text.contains(w.as_str()))
}
