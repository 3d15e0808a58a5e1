//! Ollama client implementing the [`ModelEngine`] seam.
//!
//! Uses the `/api/generate` endpoint with `stream: false`. Ollama returns a
//! `context` token array that callers may feed back to continue a
//! conversation; [`ModelEngine::reset`] drops it, which is how the pipeline
//! guarantees no cross-chunk context bleed.

use crate::engine::{ModelEngine, ModelError};

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            timeout_secs: 120,
        }
    }
}

/// Client for the Ollama REST API.
pub struct OllamaClient {
    config: OllamaConfig,
    available: bool,
    /// Context tokens from the last generation, if any.
    context: Option<serde_json::Value>,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            available: false,
            context: None,
        }
    }

    /// Probe the Ollama server to check availability.
    ///
    /// Sends a lightweight request to the `/api/tags` endpoint.
    pub fn probe(&mut self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(5))
            .build();

        self.available = matches!(agent.get(&url).call(), Ok(resp) if resp.status() == 200);
        self.available
    }

    /// Whether the Ollama server is available.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl ModelEngine for OllamaClient {
    fn reset(&mut self) -> Result<(), ModelError> {
        self.context = None;
        Ok(())
    }

    fn call(&mut self, prompt: &str) -> Result<String, ModelError> {
        if !self.available {
            return Err(ModelError::Unavailable {
                url: self.config.base_url.clone(),
            });
        }

        let url = format!("{}/api/generate", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let mut body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        if let Some(ctx) = &self.context {
            body["context"] = ctx.clone();
        }

        let body_str = serde_json::to_string(&body).map_err(|e| ModelError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(|e: ureq::Error| ModelError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| ModelError::ParseError {
            message: e.to_string(),
        })?;

        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| ModelError::ParseError {
                message: e.to_string(),
            })?;

        // Keep the returned context so uninterrupted callers could continue
        // the conversation; the pipeline resets before every call anyway.
        self.context = json.get("context").filter(|c| !c.is_null()).cloned();

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ModelError::ParseError {
                message: "missing 'response' field".into(),
            })
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("available", &self.available)
            .finish()
    }
}
