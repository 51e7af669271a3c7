use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use super::overlay::{DatePlacement, stamp, today};
use super::{ImageGenerator, decode_image};
use crate::constants::{HUGGINGFACE_API_URL, NEGATIVE_PROMPT, OPENJOURNEY_MODEL};
use crate::error::TrendartError;

#[derive(Serialize, Debug)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Serialize, Debug)]
struct InferenceParameters<'a> {
    negative_prompt: &'a str,
}

/// Hosted inference backend; the endpoint answers with raw image bytes.
#[derive(Clone, Debug)]
pub struct HuggingFaceGenerator {
    http: Client,
    base_url: Url,
    model: String,
    api_key: Option<String>,
}

impl HuggingFaceGenerator {
    /// Backend for the default host and model. The key is optional; anonymous
    /// calls are heavily rate limited.
    pub fn new(api_key: Option<String>) -> Result<Self, TrendartError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(HUGGINGFACE_API_URL)?,
            model: OPENJOURNEY_MODEL.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Overrides the inference host.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Raw image bytes for `prompt`.
    pub async fn request_image(&self, prompt: &str) -> Result<Vec<u8>, TrendartError> {
        let url = self.base_url.join(&format!("models/{}", self.model))?;
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                negative_prompt: NEGATIVE_PROMPT,
            },
        };

        let mut request = self.http.post(url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendartError::Http { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceGenerator {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str, title: &str) -> Result<DynamicImage, TrendartError> {
        info!("Requesting image from {}", self.model);
        let bytes = self.request_image(prompt).await?;
        let image = decode_image(&bytes)?;
        Ok(stamp(image, title, &today(), DatePlacement::BottomLeft))
    }
}
