//! Image generation backends.
//!
//! Every backend implements [`ImageGenerator`]; which one runs is picked at
//! startup from [`Backend`]. None of them fall back to another.

mod huggingface;
mod local;
pub mod overlay;
mod stability;

use std::io::Cursor;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::TrendartError;

pub use huggingface::HuggingFaceGenerator;
pub use local::{Device, GenerationParams, LocalDiffusionGenerator, LocalModel};
pub use stability::StabilityGenerator;

/// Generates an image from a prompt, stamping the title where the backend does so.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Short backend name for log lines
    fn name(&self) -> &'static str;

    /// Turns `prompt` into an image. `title` is only used by backends that overlay text.
    async fn generate(&self, prompt: &str, title: &str) -> Result<DynamicImage, TrendartError>;
}

/// Selectable image backends.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Backend {
    /// Hosted inference API running openjourney
    #[default]
    Huggingface,
    /// Local openjourney diffusion run
    Openjourney,
    /// Local Stable Diffusion 3 medium run, no overlay
    Sd3,
    /// Stability platform text-to-image API
    Stability,
}

/// Decodes encoded image bytes, guessing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, TrendartError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.decode()?)
}
