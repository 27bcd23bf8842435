//! Sales-pitch prompt generation through the prompt backend.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct GeneratePromptRequest<'a> {
    product_name: &'a str,
    product_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeneratePromptResponse {
    system_prompt: String,
}

/// Client for `POST {pitch_url}/generate-prompt`.
#[derive(Debug, Clone)]
pub struct PitchClient {
    client: reqwest::Client,
    base_url: String,
}

impl PitchClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the generated system prompt. Both inputs are required.
    pub async fn generate_prompt(
        &self,
        product_name: &str,
        product_url: &str,
    ) -> Result<String, ControlError> {
        let product_name = product_name.trim();
        let product_url = product_url.trim();
        if product_name.is_empty() || product_url.is_empty() {
            return Err(ControlError::MissingProductDetails);
        }

        info!(product_name, product_url, "generating sales pitch");
        let response = self
            .client
            .post(format!("{}/generate-prompt", self.base_url))
            .json(&GeneratePromptRequest {
                product_name,
                product_url,
            })
            .send()
            .await
            .map_err(ControlError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ControlError::rejected(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "pitch generation failed");
            return Err(err);
        }

        let body: GeneratePromptResponse =
            response.json().await.map_err(ControlError::Decode)?;
        Ok(body.system_prompt)
    }
}
