//! Final pipeline output.
//!
//! Assembled by the post-processing stage from the artifacts of the
//! three model stages; this is the object the presentation layer renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::{Classification, Embedding, TokenSequence};

/// Result of a successful pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// When the result was assembled
    pub timestamp: DateTime<Utc>,

    /// Original input text
    pub text: String,

    /// Input length in characters
    pub text_length: usize,

    /// Number of tokens produced by tokenization
    pub token_count: usize,

    /// Dimensionality of the embedding vector
    pub embedding_dim: usize,

    /// Predicted sentiment label
    pub sentiment: String,

    /// Classifier confidence in [0, 1]
    pub sentiment_confidence: f64,

    /// Always "success"; failed runs propagate an error instead
    pub status: String,
}

impl AnalysisResult {
    /// Assemble the final output from the stage artifacts.
    ///
    /// Pure local computation; shape queries go through the artifact
    /// types rather than any model runtime's object layout.
    pub fn assemble(
        text: &str,
        tokens: &TokenSequence,
        embedding: &Embedding,
        classification: &Classification,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            text: text.to_string(),
            text_length: text.chars().count(),
            token_count: tokens.len(),
            embedding_dim: embedding.dim(),
            sentiment: classification.label.clone(),
            sentiment_confidence: classification.confidence,
            status: "success".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble() {
        let tokens = TokenSequence::new(vec![101, 1045, 2293, 102]);
        let embedding = Embedding::new(vec![0.0; 768]);
        let classification = Classification::new("POSITIVE", 0.95);

        let result = AnalysisResult::assemble("I love this food!", &tokens, &embedding, &classification);

        assert_eq!(result.text, "I love this food!");
        assert_eq!(result.text_length, 17);
        assert_eq!(result.token_count, 4);
        assert_eq!(result.embedding_dim, 768);
        assert_eq!(result.sentiment, "POSITIVE");
        assert_eq!(result.sentiment_confidence, 0.95);
        assert_eq!(result.status, "success");
    }

    #[test]
    fn test_text_length_counts_characters() {
        let tokens = TokenSequence::new(vec![1]);
        let embedding = Embedding::new(vec![0.0]);
        let classification = Classification::new("NEUTRAL", 0.5);

        // 4 characters, more than 4 bytes
        let result = AnalysisResult::assemble("café!", &tokens, &embedding, &classification);
        assert_eq!(result.text_length, 5);
    }

    #[test]
    fn test_serialized_field_names() {
        let tokens = TokenSequence::new(vec![1, 2]);
        let embedding = Embedding::new(vec![0.0; 3]);
        let classification = Classification::new("NEGATIVE", 0.8);

        let result = AnalysisResult::assemble("bad", &tokens, &embedding, &classification);
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();

        assert!(json["timestamp"].is_string());
        assert_eq!(json["text"], "bad");
        assert_eq!(json["text_length"], 3);
        assert_eq!(json["token_count"], 2);
        assert_eq!(json["embedding_dim"], 3);
        assert_eq!(json["sentiment"], "NEGATIVE");
        assert_eq!(json["sentiment_confidence"], 0.8);
        assert_eq!(json["status"], "success");
    }
}
