// Splits an analysis document into titled sections.
use crate::model::{Classification, Metric, Section};
use regex::Regex;

/// Title used when a document contains no recognizable headings.
pub const FALLBACK_TITLE: &str = "Analysis Result";

const HEADING_MARKER: &str = "## ";

pub struct SectionSplitter {
    label_value_re: Regex,
}

impl SectionSplitter {
    pub fn new() -> Self {
        // "label: $value" lines inside a section become ad-hoc metrics.
        let label_value_re = Regex::new(
            r"^(?P<label>[^:]+):\s*(?P<value>.*\$\d+(?:,\d{3})*(?:\.\d+)?.*)$",
        )
        .expect("label/value pattern is static");
        Self { label_value_re }
    }

    /// Splits on second-level heading lines, preserving source order. A
    /// document without any heading collapses into one synthetic section
    /// holding the full text.
    pub fn split(&self, raw_text: &str) -> Vec<Section> {
        if !raw_text.lines().any(|l| l.trim_start().starts_with(HEADING_MARKER)) {
            return vec![Section {
                title: FALLBACK_TITLE.to_string(),
                body_fragments: vec![raw_text.to_string()],
                metrics: Vec::new(),
            }];
        }

        let mut sections = Vec::new();
        let mut current: Option<Section> = None;

        for line in raw_text.lines() {
            let trimmed = line.trim();
            if let Some(title) = trimmed.strip_prefix(HEADING_MARKER) {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                current = Some(Section {
                    title: title.trim().to_string(),
                    body_fragments: Vec::new(),
                    metrics: Vec::new(),
                });
                continue;
            }

            let Some(section) = current.as_mut() else {
                // Preamble before the first heading has no owning section.
                continue;
            };

            if let Some(caps) = self.label_value_re.captures(trimmed) {
                section.metrics.push(Metric {
                    label: clean_label(&caps["label"]),
                    value: caps["value"].trim().to_string(),
                    classification: Classification::Neutral,
                });
            } else if !trimmed.is_empty() {
                section.body_fragments.push(trimmed.to_string());
            }
        }

        if let Some(done) = current.take() {
            sections.push(done);
        }
        sections
    }
}

impl Default for SectionSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips list markers and markdown emphasis left of the separator.
fn clean_label(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['-', '*', ' '])
        .trim_end_matches('*')
        .trim()
        .to_string()
}
