//! Wires topic source, prompt synthesizer and image backend into a single run.

use std::path::PathBuf;

use rand::seq::IndexedRandom;
use tracing::info;

use crate::config::PipelineConfig;
use crate::constants::DEFAULT_SUBREDDITS;
use crate::error::TrendartError;
use crate::imagegen::{
    Backend, HuggingFaceGenerator, ImageGenerator, LocalDiffusionGenerator, LocalModel,
    StabilityGenerator,
};
use crate::output::save_image;
use crate::prompt::{ArtPrompt, OllamaRunner, PromptSynthesizer};
use crate::topics::{RedditApi, RedditScraper, SourceKind, TimeWindow, TopicSource};

/// What a finished run produced.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Subreddit the topics came from
    pub subreddit: String,
    /// Topics handed to the model
    pub topics: Vec<String>,
    /// Prompt and title used for the image
    pub art: ArtPrompt,
    /// Where the image was written
    pub path: PathBuf,
}

/// One configured pipeline. Each stage consumes the previous stage's output.
pub struct Pipeline {
    topics: Box<dyn TopicSource>,
    synthesizer: PromptSynthesizer,
    generator: Box<dyn ImageGenerator>,
    subreddits: Vec<String>,
    window: TimeWindow,
    limit: usize,
    output_dir: PathBuf,
}

/// Builds the topic source the config asks for.
pub fn build_topic_source(config: &PipelineConfig) -> Result<Box<dyn TopicSource>, TrendartError> {
    Ok(match config.source {
        SourceKind::Api => Box::new(RedditApi::new(config.reddit.clone())?),
        SourceKind::Scrape => Box::new(RedditScraper::new()?),
    })
}

/// Builds the image backend the config asks for.
pub fn build_generator(config: &PipelineConfig) -> Result<Box<dyn ImageGenerator>, TrendartError> {
    let command = &config.diffusion_command;
    Ok(match config.backend {
        Backend::Huggingface => {
            let api_key = config.huggingface_api_key.clone();
            Box::new(HuggingFaceGenerator::new(api_key)?)
        }
        Backend::Openjourney => Box::new(LocalDiffusionGenerator::with_command(
            command,
            LocalModel::OpenJourney,
            config.device,
        )),
        Backend::Sd3 => Box::new(LocalDiffusionGenerator::with_command(
            command,
            LocalModel::Sd3Medium,
            config.device,
        )),
        Backend::Stability => {
            let api_key = config.stability_api_key.clone();
            Box::new(StabilityGenerator::new(api_key)?)
        }
    })
}

/// Builds the prompt synthesizer around the configured local runner.
pub fn build_synthesizer(config: &PipelineConfig) -> PromptSynthesizer {
    let runner = OllamaRunner::new(&config.ollama_command, &config.ollama_model);
    PromptSynthesizer::new(Box::new(runner), config.ollama_retry)
}

impl Pipeline {
    /// Assembles a pipeline from already-built stages.
    pub fn new(
        topics: Box<dyn TopicSource>,
        synthesizer: PromptSynthesizer,
        generator: Box<dyn ImageGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            topics,
            synthesizer,
            generator,
            subreddits: config.subreddits,
            window: config.window,
            limit: config.limit,
            output_dir: config.output_dir,
        }
    }

    /// Builds every stage from configuration.
    pub fn from_config(config: PipelineConfig) -> Result<Self, TrendartError> {
        let topics = build_topic_source(&config)?;
        let generator = build_generator(&config)?;
        let synthesizer = build_synthesizer(&config);
        Ok(Self::new(topics, synthesizer, generator, config))
    }

    /// Picks one of the configured subreddits at random.
    pub fn pick_subreddit(&self) -> String {
        self.subreddits
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_SUBREDDITS[0].to_string())
    }

    /// Runs topics -> prompt -> image -> file, printing each stage's result.
    pub async fn run(&self) -> Result<RunReport, TrendartError> {
        let subreddit = self.pick_subreddit();
        info!("Fetching top {} posts of r/{subreddit} ({})", self.limit, self.window);
        let topics = self
            .topics
            .fetch_titles(&subreddit, self.window, self.limit)
            .await?;

        println!("Trending Topics:");
        for topic in &topics {
            println!("- {topic}");
        }

        let art = self.synthesizer.synthesize(&topics).await;
        println!("\nGenerated Prompt:\n{}", art.prompt);
        println!("\nGenerated Title:\n{}", art.title);

        info!("Generating image with {}", self.generator.name());
        let image = self.generator.generate(&art.prompt, &art.title).await?;
        let path = save_image(&image, &self.output_dir)?;
        println!("\nImage generated and saved as '{}'", path.display());

        Ok(RunReport {
            subreddit,
            topics,
            art,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_source_needs_credentials() {
        let config = PipelineConfig::default();
        assert!(matches!(
            build_topic_source(&config),
            Err(TrendartError::MissingCredential("REDDIT_CLIENT_ID"))
        ));
    }

    #[test]
    fn each_backend_builds() {
        for (backend, name) in [
            (Backend::Huggingface, "huggingface"),
            (Backend::Openjourney, "openjourney"),
            (Backend::Sd3, "sd3"),
            (Backend::Stability, "stability"),
        ] {
            let config = PipelineConfig {
                backend,
                ..PipelineConfig::default()
            };
            let generator = build_generator(&config).expect("build generator");
            assert_eq!(generator.name(), name);
        }
    }
}
