//! Config handling

use std::path::PathBuf;
use std::time::Duration;

use tracing::log::LevelFilter;

use crate::cli::CliOptions;
use crate::constants::{
    DEFAULT_DIFFUSION_COMMAND, DEFAULT_OLLAMA_ATTEMPTS, DEFAULT_OLLAMA_COMMAND,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_RETRY_DELAY_SECONDS, DEFAULT_REDDIT_USER_AGENT,
    DEFAULT_SUBREDDITS, DEFAULT_TOPIC_LIMIT,
};
use crate::imagegen::{Backend, Device};
use crate::retry::RetryPolicy;
use crate::topics::{RedditCredentials, SourceKind, TimeWindow};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("ureq", LevelFilter::Info)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Everything needed to build one pipeline run, passed by value to the builders.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Topic source kind
    pub source: SourceKind,
    /// Candidate subreddits; one is picked at random per run
    pub subreddits: Vec<String>,
    /// Top-post window
    pub window: TimeWindow,
    /// Topics per run
    pub limit: usize,
    /// Image backend
    pub backend: Backend,
    /// Device for local diffusion
    pub device: Device,
    /// Output directory
    pub output_dir: PathBuf,
    /// Reddit API credentials
    pub reddit: RedditCredentials,
    /// Hosted inference token
    pub huggingface_api_key: Option<String>,
    /// Stability platform key
    pub stability_api_key: Option<String>,
    /// Language model runner binary
    pub ollama_command: String,
    /// Language model name
    pub ollama_model: String,
    /// Retry policy for a missing runner binary
    pub ollama_retry: RetryPolicy,
    /// Local diffusion runner binary
    pub diffusion_command: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            window: TimeWindow::default(),
            limit: DEFAULT_TOPIC_LIMIT,
            backend: Backend::default(),
            device: Device::default(),
            output_dir: PathBuf::from("."),
            reddit: RedditCredentials {
                client_id: None,
                client_secret: None,
                user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
            },
            huggingface_api_key: None,
            stability_api_key: None,
            ollama_command: DEFAULT_OLLAMA_COMMAND.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_retry: RetryPolicy::fixed(
                DEFAULT_OLLAMA_ATTEMPTS,
                Duration::from_secs(DEFAULT_OLLAMA_RETRY_DELAY_SECONDS),
            ),
            diffusion_command: DEFAULT_DIFFUSION_COMMAND.to_string(),
        }
    }
}

impl From<CliOptions> for PipelineConfig {
    fn from(cli: CliOptions) -> Self {
        let subreddits: Vec<String> = cli
            .subreddits
            .into_iter()
            .map(|name| name.trim().trim_start_matches("r/").to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let subreddits = if subreddits.is_empty() {
            DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect()
        } else {
            subreddits
        };

        Self {
            source: cli.source,
            subreddits,
            window: cli.time_window,
            limit: cli.limit,
            backend: cli.backend,
            device: cli.device,
            output_dir: cli.output_dir,
            reddit: RedditCredentials {
                client_id: cli.reddit_client_id,
                client_secret: cli.reddit_client_secret,
                user_agent: cli.reddit_user_agent,
            },
            huggingface_api_key: cli.huggingface_api_key,
            stability_api_key: cli.stability_api_key,
            ollama_command: cli.ollama_command,
            ollama_model: cli.ollama_model,
            ollama_retry: RetryPolicy::fixed(
                cli.ollama_attempts,
                Duration::from_secs(cli.ollama_retry_delay),
            ),
            diffusion_command: cli.diffusion_command,
        }
    }
}
