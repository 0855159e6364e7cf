//! HTTP model-serving backend.
//!
//! Talks to a model server exposing `/tokenize`, `/embed`, `/classify`
//! and `/health` routes with JSON bodies. The model identifiers from the
//! `models` config section are forwarded on every request so one server
//! can host several models.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelsConfig;
use crate::domain::{Classification, Embedding, TokenSequence};

use super::ModelBackend;

/// Model backend over HTTP
pub struct HttpModelBackend {
    endpoint: String,
    models: ModelsConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    model: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    input_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input_ids: &'a [u32],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    score: f64,
}

impl HttpModelBackend {
    /// Create a backend from the `models` config section
    pub fn new(models: ModelsConfig) -> Self {
        Self {
            endpoint: models.endpoint.trim_end_matches('/').to_string(),
            models,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.endpoint, route)
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        route: &str,
        payload: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(self.url(route))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("failed to reach model server at {}", self.url(route)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("model server error on /{} ({}): {}", route, status, body.trim());
        }

        response
            .json::<Resp>()
            .await
            .with_context(|| format!("invalid response from model server on /{}", route))
    }
}

#[async_trait]
impl ModelBackend for HttpModelBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn tokenize(&self, text: &str) -> Result<TokenSequence> {
        let response: TokenizeResponse = self
            .post_json(
                "tokenize",
                &TextRequest {
                    model: &self.models.tokenizer_model,
                    text,
                },
            )
            .await?;

        Ok(TokenSequence::new(response.input_ids))
    }

    async fn embed(&self, tokens: &TokenSequence) -> Result<Embedding> {
        let response: EmbedResponse = self
            .post_json(
                "embed",
                &EmbedRequest {
                    model: &self.models.embedding_model,
                    input_ids: &tokens.ids,
                },
            )
            .await?;

        Ok(Embedding::new(response.embedding))
    }

    async fn classify(&self, text: &str) -> Result<Classification> {
        let response: ClassifyResponse = self
            .post_json(
                "classify",
                &TextRequest {
                    model: &self.models.sentiment_model,
                    text,
                },
            )
            .await?;

        Ok(Classification::new(response.label, response.score))
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .with_context(|| format!("failed to reach model server at {}", self.endpoint))?;

        if !response.status().is_success() {
            anyhow::bail!("model server unhealthy: {}", response.status());
        }

        Ok(())
    }
}
