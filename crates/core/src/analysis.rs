use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::scores::{ScoreError, SentimentScorer, SentimentScores};

/// Compound score at or beyond which text counts as positive / negative.
pub const POLARITY_THRESHOLD: f64 = 0.05;
/// `|compound|` above this is at least medium intensity.
pub const MEDIUM_INTENSITY: f64 = 0.2;
/// `|compound|` above this is high intensity.
pub const HIGH_INTENSITY: f64 = 0.5;
/// Word counts above this are at least moderate depth.
pub const MODERATE_DEPTH_WORDS: usize = 20;
/// Word counts above this are complex.
pub const COMPLEX_DEPTH_WORDS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if compound <= -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn from_compound(compound: f64) -> Self {
        let magnitude = compound.abs();
        if magnitude > HIGH_INTENSITY {
            Intensity::High
        } else if magnitude > MEDIUM_INTENSITY {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => write!(f, "Low"),
            Intensity::Medium => write!(f, "Medium"),
            Intensity::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "Very Happy")]
    VeryHappy,
    Happy,
    #[serde(rename = "Slightly Positive")]
    SlightlyPositive,
    #[serde(rename = "Very Sad")]
    VerySad,
    Sad,
    #[serde(rename = "Slightly Negative")]
    SlightlyNegative,
}

impl Emotion {
    /// Tag for a compound score; `None` only for a score of exactly zero.
    pub fn from_compound(compound: f64) -> Option<Self> {
        if compound > 0.0 {
            Some(if compound > HIGH_INTENSITY {
                Emotion::VeryHappy
            } else if compound > MEDIUM_INTENSITY {
                Emotion::Happy
            } else {
                Emotion::SlightlyPositive
            })
        } else if compound < 0.0 {
            Some(if compound < -HIGH_INTENSITY {
                Emotion::VerySad
            } else if compound < -MEDIUM_INTENSITY {
                Emotion::Sad
            } else {
                Emotion::SlightlyNegative
            })
        } else {
            None
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Emotion::VeryHappy | Emotion::Happy | Emotion::SlightlyPositive)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::VeryHappy => write!(f, "Very Happy"),
            Emotion::Happy => write!(f, "Happy"),
            Emotion::SlightlyPositive => write!(f, "Slightly Positive"),
            Emotion::VerySad => write!(f, "Very Sad"),
            Emotion::Sad => write!(f, "Sad"),
            Emotion::SlightlyNegative => write!(f, "Slightly Negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Depth {
    Basic,
    Moderate,
    Complex,
}

impl Depth {
    pub fn from_word_count(words: usize) -> Self {
        if words > COMPLEX_DEPTH_WORDS {
            Depth::Complex
        } else if words > MODERATE_DEPTH_WORDS {
            Depth::Moderate
        } else {
            Depth::Basic
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Basic => write!(f, "Basic"),
            Depth::Moderate => write!(f, "Moderate"),
            Depth::Complex => write!(f, "Complex"),
        }
    }
}

/// The four scores restated under descriptive names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalIndicators {
    pub positive_words: f64,
    pub negative_words: f64,
    pub neutral_words: f64,
    pub compound_score: f64,
}

impl From<SentimentScores> for EmotionalIndicators {
    fn from(s: SentimentScores) -> Self {
        Self {
            positive_words: s.positive,
            negative_words: s.negative,
            neutral_words: s.neutral,
            compound_score: s.compound,
        }
    }
}

/// Structured sentiment summary of one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalAnalysis {
    pub overall_sentiment: Sentiment,
    pub emotional_intensity: Intensity,
    /// Zero or one tag.
    pub primary_emotions: Vec<Emotion>,
    pub emotional_depth: Depth,
    pub sentiment_scores: SentimentScores,
    /// Whitespace-separated word count.
    pub text_length: usize,
    pub emotional_indicators: EmotionalIndicators,
}

impl EmotionalAnalysis {
    /// Derive every label from the scores and the word count.
    pub fn from_scores(scores: SentimentScores, word_count: usize) -> Self {
        Self {
            overall_sentiment: Sentiment::from_compound(scores.compound),
            emotional_intensity: Intensity::from_compound(scores.compound),
            primary_emotions: Emotion::from_compound(scores.compound).into_iter().collect(),
            emotional_depth: Depth::from_word_count(word_count),
            sentiment_scores: scores,
            text_length: word_count,
            emotional_indicators: scores.into(),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Scores text with a lexicon scorer and applies the fixed label thresholds.
#[derive(Clone)]
pub struct EmotionClassifier {
    scorer: Arc<dyn SentimentScorer>,
}

impl EmotionClassifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    pub fn classify(&self, text: &str) -> Result<EmotionalAnalysis, ScoreError> {
        let scores = self.scorer.score(text)?;
        Ok(EmotionalAnalysis::from_scores(scores, word_count(text)))
    }
}

impl fmt::Debug for EmotionClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmotionClassifier").finish_non_exhaustive()
    }
}
