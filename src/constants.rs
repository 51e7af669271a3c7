//! Shared constants for the pipeline stages
//!

/// Subreddits the orchestrator picks from when none are configured.
pub const DEFAULT_SUBREDDITS: [&str; 3] = ["upliftingnews", "worldnews", "technology"];

/// How many posts are pulled per run by default.
pub const DEFAULT_TOPIC_LIMIT: usize = 10;

/// User agent sent to the Reddit API unless overridden. Env: REDDIT_USER_AGENT
pub const DEFAULT_REDDIT_USER_AGENT: &str = "my_news_scraper/0.1";

/// Browser-like user agent used for the unauthenticated scrape.
pub const SCRAPE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Where OAuth tokens for the Reddit API are requested.
pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Base for authenticated Reddit API calls.
pub const REDDIT_API_URL: &str = "https://oauth.reddit.com/";

/// Base for the scrape fallback; the old layout carries the `top-matter` markup.
pub const REDDIT_SCRAPE_URL: &str = "https://old.reddit.com/";

/// Returned by the scraper when the page held no recognisable titles.
pub const SCRAPE_SENTINEL: &str = "Unable to fetch trending topics";

/// Prompt used when the language model gave us nothing usable.
pub const FALLBACK_PROMPT: &str = "A colorful abstract representation of current events";

/// Title paired with [`FALLBACK_PROMPT`].
pub const FALLBACK_TITLE: &str = "The Pulse of Now";

/// Local language model runner binary.
pub const DEFAULT_OLLAMA_COMMAND: &str = "ollama";

/// Model the runner is asked to load.
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";

/// Attempts made while the runner binary cannot be found.
pub const DEFAULT_OLLAMA_ATTEMPTS: u32 = 3;

/// Seconds slept between runner lookup attempts.
pub const DEFAULT_OLLAMA_RETRY_DELAY_SECONDS: u64 = 5;

/// Style every backend is told to avoid.
pub const NEGATIVE_PROMPT: &str = "photorealistic";

/// Hosted inference base URL.
pub const HUGGINGFACE_API_URL: &str = "https://api-inference.huggingface.co/";

/// Model used by the hosted inference and the first local diffusion variant.
pub const OPENJOURNEY_MODEL: &str = "prompthero/openjourney";

/// Model used by the second local diffusion variant.
pub const SD3_MEDIUM_MODEL: &str = "stabilityai/stable-diffusion-3-medium-diffusers";

/// Local diffusion runner binary.
pub const DEFAULT_DIFFUSION_COMMAND: &str = "stable-diffusion";

/// Stability platform host.
pub const STABILITY_API_HOST: &str = "https://api.stability.ai/";

/// Engine requested from the Stability platform.
pub const STABILITY_ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";

/// Saved images are named `<prefix><N>.png`.
pub const OUTPUT_FILE_PREFIX: &str = "generated_image_";
