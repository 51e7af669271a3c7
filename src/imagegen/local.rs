use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::process::Command;
use tracing::{debug, info};

use super::ImageGenerator;
use super::overlay::{DatePlacement, stamp, today};
use crate::constants::{
    DEFAULT_DIFFUSION_COMMAND, NEGATIVE_PROMPT, OPENJOURNEY_MODEL, SD3_MEDIUM_MODEL,
};
use crate::error::TrendartError;

/// Compute device handed to the diffusion runner.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Device {
    /// Use CUDA when `nvidia-smi` reports a GPU, otherwise CPU
    #[default]
    Auto,
    /// CUDA with half precision
    Cuda,
    /// CPU with full precision
    Cpu,
}

impl Device {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cuda => "cuda",
            Self::Auto | Self::Cpu => "cpu",
        }
    }

    fn dtype(self) -> &'static str {
        match self {
            Self::Cuda => "f16",
            Self::Auto | Self::Cpu => "f32",
        }
    }

    /// Resolves `Auto` by probing for a GPU.
    pub async fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                let probe = Command::new("nvidia-smi").arg("-L").output().await;
                match probe {
                    Ok(output) if output.status.success() => Self::Cuda,
                    _ => Self::Cpu,
                }
            }
            other => other,
        }
    }
}

/// Fixed sampling parameters passed to the runner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    /// Denoising steps
    pub steps: u32,
    /// Classifier-free guidance scale
    pub guidance_scale: f32,
    /// Output height in pixels
    pub height: u32,
    /// Output width in pixels
    pub width: u32,
}

/// The pretrained models the local backend knows how to run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LocalModel {
    /// prompthero/openjourney with runner defaults, title/date overlaid
    OpenJourney,
    /// Stable Diffusion 3 medium with fixed parameters, returned bare
    Sd3Medium,
}

impl LocalModel {
    /// Model identifier passed to the runner.
    pub fn model_id(self) -> &'static str {
        match self {
            Self::OpenJourney => OPENJOURNEY_MODEL,
            Self::Sd3Medium => SD3_MEDIUM_MODEL,
        }
    }

    /// Explicit sampling parameters, if the model pins any.
    pub fn params(self) -> Option<GenerationParams> {
        match self {
            Self::OpenJourney => None,
            Self::Sd3Medium => Some(GenerationParams {
                steps: 28,
                guidance_scale: 7.0,
                height: 512,
                width: 512,
            }),
        }
    }

    /// Where the date goes, or `None` when no overlay is applied.
    pub fn overlay(self) -> Option<DatePlacement> {
        match self {
            Self::OpenJourney => Some(DatePlacement::BottomLeft),
            Self::Sd3Medium => None,
        }
    }

    /// Whether attention slicing is requested when running on CPU.
    fn slices_attention_on_cpu(self) -> bool {
        matches!(self, Self::Sd3Medium)
    }
}

/// Runs a diffusion model through an external runner process.
#[derive(Clone, Debug)]
pub struct LocalDiffusionGenerator {
    command: String,
    model: LocalModel,
    device: Device,
}

impl LocalDiffusionGenerator {
    /// Generator using the default runner binary.
    pub fn new(model: LocalModel, device: Device) -> Self {
        Self::with_command(DEFAULT_DIFFUSION_COMMAND, model, device)
    }

    /// Generator using a specific runner binary.
    pub fn with_command(command: impl Into<String>, model: LocalModel, device: Device) -> Self {
        Self {
            command: command.into(),
            model,
            device,
        }
    }

    /// Arguments for one run on a resolved device, writing to `output`.
    pub fn runner_args(&self, prompt: &str, device: Device, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--model-id".into(),
            self.model.model_id().into(),
            "--prompt".into(),
            prompt.into(),
            "--negative-prompt".into(),
            NEGATIVE_PROMPT.into(),
            "--device".into(),
            device.as_str().into(),
            "--dtype".into(),
            device.dtype().into(),
            "--output".into(),
            output.as_os_str().to_owned(),
        ];

        if let Some(params) = self.model.params() {
            args.extend([
                "--steps".into(),
                params.steps.to_string().into(),
                "--guidance-scale".into(),
                params.guidance_scale.to_string().into(),
                "--height".into(),
                params.height.to_string().into(),
                "--width".into(),
                params.width.to_string().into(),
            ]);
        }

        if device != Device::Cuda && self.model.slices_attention_on_cpu() {
            args.push("--attention-slicing".into());
        }
        args
    }

    async fn run_model(&self, prompt: &str) -> Result<DynamicImage, TrendartError> {
        let device = self.device.resolve().await;
        let workdir = tempfile::tempdir()?;
        let output_path = workdir.path().join("image.png");
        let args = self.runner_args(prompt, device, &output_path);

        info!(
            "Running {} on {} ({})",
            self.model.model_id(),
            device.as_str(),
            device.dtype()
        );
        let output = Command::new(&self.command)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    TrendartError::Runner(format!("{} not found in PATH", self.command))
                } else {
                    TrendartError::Io(err)
                }
            })?;

        debug!("runner stdout: {}", String::from_utf8_lossy(&output.stdout));
        if !output.status.success() {
            return Err(TrendartError::Runner(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(image::open(&output_path)?)
    }
}

#[async_trait]
impl ImageGenerator for LocalDiffusionGenerator {
    fn name(&self) -> &'static str {
        match self.model {
            LocalModel::OpenJourney => "openjourney",
            LocalModel::Sd3Medium => "sd3",
        }
    }

    async fn generate(&self, prompt: &str, title: &str) -> Result<DynamicImage, TrendartError> {
        let image = self.run_model(prompt).await?;
        Ok(match self.model.overlay() {
            Some(placement) => stamp(image, title, &today(), placement),
            None => image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn openjourney_uses_runner_defaults() {
        let generator = LocalDiffusionGenerator::new(LocalModel::OpenJourney, Device::Cuda);
        let args = strings(generator.runner_args(
            "a drawing",
            Device::Cuda,
            Path::new("/tmp/o.png"),
        ));
        assert_eq!(
            args,
            vec![
                "--model-id",
                "prompthero/openjourney",
                "--prompt",
                "a drawing",
                "--negative-prompt",
                "photorealistic",
                "--device",
                "cuda",
                "--dtype",
                "f16",
                "--output",
                "/tmp/o.png",
            ]
        );
    }

    #[test]
    fn sd3_pins_parameters_and_slices_on_cpu() {
        let generator = LocalDiffusionGenerator::new(LocalModel::Sd3Medium, Device::Cpu);
        let args = strings(generator.runner_args("p", Device::Cpu, Path::new("out.png")));
        assert!(args.windows(2).any(|w| w == ["--steps", "28"]));
        assert!(args.windows(2).any(|w| w == ["--guidance-scale", "7"]));
        assert!(args.windows(2).any(|w| w == ["--height", "512"]));
        assert!(args.windows(2).any(|w| w == ["--width", "512"]));
        assert!(args.windows(2).any(|w| w == ["--dtype", "f32"]));
        assert_eq!(args.last().map(String::as_str), Some("--attention-slicing"));

        let gpu = strings(generator.runner_args("p", Device::Cuda, Path::new("out.png")));
        assert!(!gpu.iter().any(|arg| arg == "--attention-slicing"));
    }

    #[test]
    fn only_openjourney_is_stamped() {
        assert_eq!(LocalModel::OpenJourney.overlay(), Some(DatePlacement::BottomLeft));
        assert_eq!(LocalModel::Sd3Medium.overlay(), None);
    }

    #[tokio::test]
    async fn missing_runner_is_reported() {
        let generator = LocalDiffusionGenerator::with_command(
            "trendart-no-such-diffusion-runner",
            LocalModel::Sd3Medium,
            Device::Cpu,
        );
        let err = generator.generate("p", "t").await.expect_err("should fail");
        assert!(matches!(err, TrendartError::Runner(message) if message.contains("not found")));
    }
}
