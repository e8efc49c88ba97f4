use serde::{Deserialize, Serialize};
use ts_rs::TS;
use unicode_segmentation::UnicodeSegmentation;

/// Unit the summarize threshold is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ThresholdUnit {
    Characters,
    Words,
}

/// Summarization is only offered for text strictly longer than `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummarizeThreshold {
    pub unit: ThresholdUnit,
    #[ts(type = "number")]
    pub limit: usize,
}

impl Default for SummarizeThreshold {
    fn default() -> Self {
        Self {
            unit: ThresholdUnit::Characters,
            limit: 150,
        }
    }
}

impl SummarizeThreshold {
    pub fn measure(&self, text: &str) -> usize {
        match self.unit {
            ThresholdUnit::Characters => char_count(text),
            ThresholdUnit::Words => word_count(text),
        }
    }

    pub fn is_exceeded_by(&self, text: &str) -> bool {
        self.measure(text) > self.limit
    }
}

/// Unicode scalar values, not bytes
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Words per UAX #29; punctuation and whitespace are not words
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}
