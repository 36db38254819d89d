pub mod analysis;
pub mod scores;

pub use analysis::{
    word_count, Depth, Emotion, EmotionClassifier, EmotionalAnalysis, EmotionalIndicators,
    Intensity, Sentiment,
};
pub use scores::{FixedScorer, ScoreError, SentimentScorer, SentimentScores, VaderScorer};
