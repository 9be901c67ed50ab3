//! Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use super::gemini_types::{
    permissive_safety_settings, Content, GenerateContentRequest, GenerateContentResponse, Part,
};
use super::{ClassifierError, GenerativeModel, ImageInput};

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClassifierError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn build_request(prompt: &str, image: Option<&ImageInput>) -> GenerateContentRequest {
    let mut parts = vec![Part::text(prompt)];
    if let Some(image) = image {
        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        parts.push(Part::inline(&image.mime_type, data));
    }
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        safety_settings: permissive_safety_settings(),
    }
}

/// Pull the reply text out of a response, treating every kind of
/// withheld answer as a refusal.
fn extract_text(response: GenerateContentResponse) -> Result<String, ClassifierError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ClassifierError::Refused(reason));
    }

    let candidate = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| ClassifierError::Refused("no candidates".into()))?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(ClassifierError::Refused("SAFETY".into()));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "empty reply".into());
        return Err(ClassifierError::Refused(reason));
    }
    Ok(text)
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImageInput>,
    ) -> Result<String, ClassifierError> {
        let body = build_request(prompt, image);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ClassifierError::Connection(self.base_url.clone())
                } else {
                    ClassifierError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        extract_text(parsed)
    }
}
