//! CLI parser
use clap::Parser;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_DIFFUSION_COMMAND, DEFAULT_OLLAMA_ATTEMPTS, DEFAULT_OLLAMA_COMMAND,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_RETRY_DELAY_SECONDS, DEFAULT_REDDIT_USER_AGENT,
    DEFAULT_TOPIC_LIMIT,
};
use crate::imagegen::{Backend, Device};
use crate::topics::{SourceKind, TimeWindow};

#[derive(Parser, Debug)]
#[command(
    name = "trendart",
    about = "Paint today's trending Reddit topics: topics -> local LLM prompt -> image backend -> PNG"
)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "TRENDART_DEBUG")]
    /// Enable debug logging. Env: TRENDART_DEBUG
    pub debug: bool,

    #[clap(long, value_enum, default_value_t = SourceKind::Api, env = "TRENDART_SOURCE")]
    /// Where topics come from, the API or a page scrape.
    /// Env: TRENDART_SOURCE
    pub source: SourceKind,

    #[clap(
        long = "subreddit",
        env = "TRENDART_SUBREDDITS",
        value_delimiter = ',',
        default_values = ["upliftingnews", "worldnews", "technology"]
    )]
    /// Subreddits to pick from at random, repeatable or comma separated.
    /// Env: TRENDART_SUBREDDITS
    pub subreddits: Vec<String>,

    #[clap(long, value_enum, default_value_t = TimeWindow::Day, env = "TRENDART_TIME_WINDOW")]
    /// Top-post window. Env: TRENDART_TIME_WINDOW
    pub time_window: TimeWindow,

    #[clap(long, default_value_t = DEFAULT_TOPIC_LIMIT, env = "TRENDART_LIMIT")]
    /// Number of topics to fetch, defaults to `10`.
    /// Env: TRENDART_LIMIT
    pub limit: usize,

    #[clap(long, value_enum, default_value_t = Backend::Huggingface, env = "TRENDART_BACKEND")]
    /// Image backend. Env: TRENDART_BACKEND
    pub backend: Backend,

    #[clap(long, value_enum, default_value_t = Device::Auto, env = "TRENDART_DEVICE")]
    /// Device for the local diffusion backends. Env: TRENDART_DEVICE
    pub device: Device,

    #[clap(long, default_value = ".", env = "TRENDART_OUTPUT_DIR")]
    /// Directory the `generated_image_<N>.png` files go in.
    /// Env: TRENDART_OUTPUT_DIR
    pub output_dir: PathBuf,

    #[clap(long, env = "REDDIT_CLIENT_ID", hide_env_values = true)]
    /// Reddit API client id. Env: REDDIT_CLIENT_ID
    pub reddit_client_id: Option<String>,

    #[clap(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    /// Reddit API client secret. Env: REDDIT_CLIENT_SECRET
    pub reddit_client_secret: Option<String>,

    #[clap(long, default_value = DEFAULT_REDDIT_USER_AGENT, env = "REDDIT_USER_AGENT")]
    /// User agent for Reddit API calls. Env: REDDIT_USER_AGENT
    pub reddit_user_agent: String,

    #[clap(long, env = "HUGGINGFACE_API_KEY", hide_env_values = true)]
    /// Hosted inference token. Env: HUGGINGFACE_API_KEY
    pub huggingface_api_key: Option<String>,

    #[clap(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    /// Stability platform key, required by the `stability` backend.
    /// Env: STABILITY_API_KEY
    pub stability_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_OLLAMA_COMMAND, env = "TRENDART_OLLAMA_COMMAND")]
    /// Language model runner binary. Env: TRENDART_OLLAMA_COMMAND
    pub ollama_command: String,

    #[clap(long, default_value = DEFAULT_OLLAMA_MODEL, env = "TRENDART_OLLAMA_MODEL")]
    /// Model the runner loads. Env: TRENDART_OLLAMA_MODEL
    pub ollama_model: String,

    #[clap(long, default_value_t = DEFAULT_OLLAMA_ATTEMPTS, env = "TRENDART_OLLAMA_ATTEMPTS")]
    /// Attempts while the runner binary is missing. Env: TRENDART_OLLAMA_ATTEMPTS
    pub ollama_attempts: u32,

    #[clap(
        long,
        default_value_t = DEFAULT_OLLAMA_RETRY_DELAY_SECONDS,
        env = "TRENDART_OLLAMA_RETRY_DELAY"
    )]
    /// Seconds between runner attempts. Env: TRENDART_OLLAMA_RETRY_DELAY
    pub ollama_retry_delay: u64,

    #[clap(long, default_value = DEFAULT_DIFFUSION_COMMAND, env = "TRENDART_DIFFUSION_COMMAND")]
    /// Local diffusion runner binary. Env: TRENDART_DIFFUSION_COMMAND
    pub diffusion_command: String,
}
