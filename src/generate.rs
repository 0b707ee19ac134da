//! Description generator client.
//!
//! Sends a task title to a remote text-generation endpoint and returns a
//! short description. Failures carry the upstream error message and are
//! best-effort for callers: task creation proceeds without a description.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the description-generation endpoint.
#[derive(Debug, Clone)]
pub struct DescriptionClient {
    endpoint: String,
    http: reqwest::Client,
}

impl DescriptionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(endpoint: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// Generate a description for `title`.
    pub async fn generate(&self, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&GenerateRequest { title })
            .send()
            .await
            .map_err(|err| Error::Generation(err.to_string()))?;

        let status = response.status();
        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| Error::Generation(format!("malformed response: {err}")))?;

        if !status.is_success() || !payload.success {
            let message = payload
                .error
                .unwrap_or_else(|| format!("endpoint returned status {status}"));
            return Err(Error::Generation(message));
        }

        match payload.description {
            Some(description) if !description.trim().is_empty() => Ok(description),
            _ => Err(Error::Generation("no description generated".to_string())),
        }
    }
}
