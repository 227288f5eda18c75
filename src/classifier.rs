// Topic and sentiment classification for incoming news items.
use crate::config::KeywordConfig;
use crate::model::{Category, Sentiment};

/// Pure keyword classifier. The topic lists are matched in a fixed priority
/// order (bitcoin, ethereum, defi, regulation, technology); sentiment is an
/// occurrence count over bilingual positive/negative lists.
pub struct NewsClassifier {
    topics: Vec<(Category, Vec<String>)>,
    positive: Vec<String>,
    negative: Vec<String>,
}

impl NewsClassifier {
    pub fn new(keywords: &KeywordConfig) -> Self {
        let topics = vec![
            (Category::Bitcoin, lowercase_all(&keywords.bitcoin_terms)),
            (Category::Ethereum, lowercase_all(&keywords.ethereum_terms)),
            (Category::Defi, lowercase_all(&keywords.defi_terms)),
            (Category::Regulation, lowercase_all(&keywords.regulation_terms)),
            (Category::Technology, lowercase_all(&keywords.technology_terms)),
        ];
        Self {
            topics,
            positive: lowercase_all(&keywords.positive),
            negative: lowercase_all(&keywords.negative),
        }
    }

    pub fn classify(&self, title: &str, summary: &str) -> (Category, Sentiment) {
        let text = format!("{} {}", title, summary).to_lowercase();
        (self.categorize(&text), self.sentiment(&text))
    }

    fn categorize(&self, text: &str) -> Category {
        for (category, terms) in &self.topics {
            if terms.iter().any(|t| text.contains(t.as_str())) {
                return *category;
            }
        }
        Category::General
    }

    fn sentiment(&self, text: &str) -> Sentiment {
        let positive_score = count_occurrences(text, &self.positive);
        let negative_score = count_occurrences(text, &self.negative);
        if positive_score > negative_score {
            Sentiment::Positive
        } else if negative_score > positive_score {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

fn count_occurrences(text: &str, words: &[String]) -> usize {
    words.iter().map(|w| text.matches(w.as_str()).count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordConfig;

    fn classifier() -> NewsClassifier {
        NewsClassifier::new(&KeywordConfig::default())
    }

    #[test]
    fn bitcoin_terms_take_priority() {
        // Mentions both btc and staking; bitcoin sits earlier in the order.
        let (category, _) = classifier().classify("BTC staking products grow", "");
        assert_eq!(category, Category::Bitcoin);
    }

    #[test]
    fn unmatched_text_is_general() {
        let (category, sentiment) = classifier().classify("quiet week in markets", "");
        assert_eq!(category, Category::General);
        assert_eq!(sentiment, Sentiment::Neutral);
    }

    #[test]
    fn sentiment_counts_beat_single_mentions() {
        let (_, sentiment) = classifier().classify(
            "rally continues",
            "surge in adoption despite one hack report",
        );
        assert_eq!(sentiment, Sentiment::Positive);
    }

    #[test]
    fn tie_is_neutral() {
        let (_, sentiment) = classifier().classify("rally meets crash", "");
        assert_eq!(sentiment, Sentiment::Neutral);
    }

    #[test]
    fn japanese_text_is_classified() {
        let (category, sentiment) =
            classifier().classify("ビットコイン価格が上昇", "機関投資家の採用が進む");
        assert_eq!(category, Category::Bitcoin);
        assert_eq!(sentiment, Sentiment::Positive);
    }

    #[test]
    fn classification_is_deterministic() {
        let first = classifier().classify("Ethereum merge delayed", "staking concerns");
        let second = classifier().classify("Ethereum merge delayed", "staking concerns");
        assert_eq!(first, second);
    }
}
