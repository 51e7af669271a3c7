//! Picking an unused output filename and writing the image.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::constants::OUTPUT_FILE_PREFIX;
use crate::error::TrendartError;

/// `generated_image_<index>.png` inside `dir`.
pub fn output_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("{OUTPUT_FILE_PREFIX}{index}.png"))
}

/// First `generated_image_<N>.png` in `dir` that does not exist yet, probing
/// from N = 1. Nothing is reserved, so two concurrent runs can pick the same name.
pub fn next_available_path(dir: &Path) -> PathBuf {
    let mut index = 1;
    loop {
        let candidate = output_path(dir, index);
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

/// Saves `image` as PNG under the next free name in `dir` and returns the path.
pub fn save_image(image: &DynamicImage, dir: &Path) -> Result<PathBuf, TrendartError> {
    let path = next_available_path(dir);
    image.save_with_format(&path, ImageFormat::Png)?;
    info!("Saved {}", path.display());
    Ok(path)
}
