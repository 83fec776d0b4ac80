//! Tribute Composition Gateway
//!
//! Relays a structured prompt to an external text-generation service and
//! hands back the first generated text block. This is an API-client shim:
//! nothing is stored, and upstream failures collapse to a single
//! "AI service unavailable" answer for the caller.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

pub type TributeResult<T> = Result<T, TributeError>;

#[derive(Error, Debug)]
pub enum TributeError {
    #[error("AI request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("AI response contained no text block")]
    EmptyResponse,
}

/// Structured prompt submitted by the front-end.
#[derive(Debug, Deserialize)]
pub struct TributeRequest {
    pub relationship: Option<String>,
    #[serde(default)]
    pub memories: Vec<String>,
    #[serde(rename = "specificMemory")]
    pub specific_memory: Option<String>,
    pub name: Option<String>,
}

pub struct TributeComposer {
    http_client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl TributeComposer {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_url,
            api_key,
            model,
        }
    }

    /// Build a composer from `AI_API_URL`, `AI_API_KEY` and `AI_MODEL`.
    pub fn from_env() -> Self {
        if env::var("AI_API_KEY").is_err() {
            log::warn!("AI_API_KEY not set, tribute composition will be unavailable");
        }
        Self::new(
            env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            env::var("AI_API_KEY").ok(),
            env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        )
    }

    /// Render the natural-language prompt sent upstream.
    pub fn build_prompt(request: &TributeRequest) -> String {
        let relationship = request.relationship.as_deref().unwrap_or("").trim();
        let name = request.name.as_deref().unwrap_or("").trim();

        let memories: Vec<&str> = request
            .memories
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect();

        let mut prompt = format!(
            "Write a short, heartfelt memorial tribute to Eleanor from her {}.",
            relationship
        );
        if !name.is_empty() {
            prompt.push_str(&format!(" The tribute is from {}.", name));
        }
        prompt.push_str(&format!(
            " Weave in these memories of her: {}.",
            memories.join("; ")
        ));
        if let Some(specific) = request.specific_memory.as_deref() {
            let specific = specific.trim();
            if !specific.is_empty() {
                prompt.push_str(&format!(
                    " Give special weight to this moment: {}.",
                    specific
                ));
            }
        }
        prompt.push_str(
            " Keep it to one warm paragraph, written in the first person, \
             without headings or sign-offs.",
        );
        prompt
    }

    /// Forward the templated prompt upstream and return the first text
    /// block of the generated reply.
    pub async fn compose(&self, request: &TributeRequest) -> TributeResult<String> {
        let prompt = Self::build_prompt(request);

        let mut upstream = self
            .http_client
            .post(&self.api_url)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": 400,
                "messages": [{"role": "user", "content": prompt}]
            }));
        if let Some(key) = &self.api_key {
            upstream = upstream.header("x-api-key", key.as_str());
        }

        let body: serde_json::Value = upstream
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or(TributeError::EmptyResponse)
    }
}
