use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoreError {
    #[error("Sentiment scorer did not report a '{0}' score")]
    MissingComponent(&'static str),
    #[error("Sentiment scorer returned a non-finite '{0}' score")]
    NonFinite(&'static str),
}

/// Four-way polarity scores as reported by a lexicon scorer.
///
/// Serialized with the lexicon's own keys (`pos`, `neg`, `neu`, `compound`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(rename = "neg")]
    pub negative: f64,
    #[serde(rename = "neu")]
    pub neutral: f64,
    #[serde(rename = "pos")]
    pub positive: f64,
    /// Normalized overall polarity, roughly in [-1, 1].
    pub compound: f64,
}

impl SentimentScores {
    /// Build scores from a `{neg, neu, pos, compound}` map, rejecting missing
    /// or non-finite components.
    pub fn from_components(components: &HashMap<&str, f64>) -> Result<Self, ScoreError> {
        let get = |key: &'static str| -> Result<f64, ScoreError> {
            let value = components
                .get(key)
                .copied()
                .ok_or(ScoreError::MissingComponent(key))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ScoreError::NonFinite(key))
            }
        };

        Ok(Self {
            negative: get("neg")?,
            neutral: get("neu")?,
            positive: get("pos")?,
            compound: get("compound")?,
        })
    }

    /// Scores for text with no polarity at all.
    pub fn neutral() -> Self {
        Self { negative: 0.0, neutral: 1.0, positive: 0.0, compound: 0.0 }
    }
}

/// Abstraction over a lexicon-based sentiment scorer.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<SentimentScores, ScoreError>;
}

// ── VADER scorer ──────────────────────────────────────────────────────────────

/// Scores text with the VADER lexicon.
#[derive(Debug, Default, Clone, Copy)]
pub struct VaderScorer;

impl VaderScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> Result<SentimentScores, ScoreError> {
        // The analyzer only borrows the static lexicon, so building one per call is cheap.
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let components = analyzer.polarity_scores(text);
        SentimentScores::from_components(&components)
    }
}

// ── Fixed scorer (tests and dry runs) ─────────────────────────────────────────

/// Returns the same scores for every input.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer {
    pub scores: SentimentScores,
}

impl FixedScorer {
    pub fn new(scores: SentimentScores) -> Self {
        Self { scores }
    }

    /// Neutral split with the given compound value.
    pub fn with_compound(compound: f64) -> Self {
        Self::new(SentimentScores { compound, ..SentimentScores::neutral() })
    }
}

impl SentimentScorer for FixedScorer {
    fn score(&self, _text: &str) -> Result<SentimentScores, ScoreError> {
        Ok(self.scores)
    }
}
