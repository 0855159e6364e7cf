//! Stage artifacts with queryable shape.
//!
//! The post-processing stage needs the token count and embedding
//! dimensionality without depending on any particular model runtime's
//! object layout, so artifacts own their shape.

use serde::{Deserialize, Serialize};

/// Token ids produced by the tokenization stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence {
    /// Vocabulary ids in input order
    pub ids: Vec<u32>,
}

impl TokenSequence {
    /// Create a token sequence from raw ids
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Dense vector produced by the embedding stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Vector components
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding from raw components
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Dimensionality of the vector
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Label and confidence produced by the sentiment stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Predicted label (e.g. "POSITIVE")
    pub label: String,

    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Classification {
    /// Create a classification result
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}
