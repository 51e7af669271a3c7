use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use image::DynamicImage;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::overlay::{DatePlacement, stamp, today};
use super::{ImageGenerator, decode_image};
use crate::constants::{STABILITY_API_HOST, STABILITY_ENGINE_ID};
use crate::error::TrendartError;

/// Request body for POST /v1/generation/{engine}/text-to-image
#[derive(Serialize, Debug)]
struct TextToImageRequest<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

#[derive(Serialize, Debug)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct TextToImageResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize, Debug)]
struct Artifact {
    base64: String,
}

/// Stability platform backend.
#[derive(Clone, Debug)]
pub struct StabilityGenerator {
    http: Client,
    host: Url,
    engine_id: String,
    api_key: Option<String>,
}

impl StabilityGenerator {
    /// Backend for the public host. A missing key is only reported when
    /// generating, before any request is made.
    pub fn new(api_key: Option<String>) -> Result<Self, TrendartError> {
        Ok(Self {
            http: Client::new(),
            host: Url::parse(STABILITY_API_HOST)?,
            // Upstream labels this the SD3 engine, but it is the SDXL 1024 one; kept as-is.
            engine_id: STABILITY_ENGINE_ID.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Overrides the API host.
    pub fn with_host(mut self, host: Url) -> Self {
        self.host = host;
        self
    }

    /// Decoded bytes of the first returned artifact.
    pub async fn request_image(&self, prompt: &str) -> Result<Vec<u8>, TrendartError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TrendartError::MissingCredential("STABILITY_API_KEY"))?;

        let url = self.host.join(&format!(
            "v1/generation/{}/text-to-image",
            self.engine_id
        ))?;
        let body = TextToImageRequest {
            text_prompts: vec![TextPrompt { text: prompt }],
            cfg_scale: 7,
            height: 1024,
            width: 1024,
            samples: 1,
            steps: 28,
        };

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if status != reqwest::StatusCode::OK {
            return Err(TrendartError::Http {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: TextToImageResponse = serde_json::from_slice(&bytes)?;
        let first = parsed
            .artifacts
            .into_iter()
            .next()
            .ok_or(TrendartError::MissingArtifact)?;
        Ok(general_purpose::STANDARD.decode(first.base64)?)
    }
}

#[async_trait]
impl ImageGenerator for StabilityGenerator {
    fn name(&self) -> &'static str {
        "stability"
    }

    async fn generate(&self, prompt: &str, title: &str) -> Result<DynamicImage, TrendartError> {
        info!("Requesting image from engine {}", self.engine_id);
        let bytes = self.request_image(prompt).await?;
        let image = decode_image(&bytes)?;
        Ok(stamp(image, title, &today(), DatePlacement::BelowTitle))
    }
}
