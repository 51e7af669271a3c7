//! Turns a list of topics into an art prompt and title using a local language model.

use std::fmt::Write;
use std::io::ErrorKind;
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::constants::{
    DEFAULT_OLLAMA_COMMAND, DEFAULT_OLLAMA_MODEL, FALLBACK_PROMPT, FALLBACK_TITLE,
};
use crate::retry::RetryPolicy;

const PROMPT_MARKER: &str = "Prompt: ";
const TITLE_MARKER: &str = "Title: ";

const INSTRUCTION_HEAD: &str = r#"You are an AI artist. Your job is to create a short prompt for a text-to-image model that will make a piece of art
in the form of a painting or drawing based on the most trending topics in the world today. Here are today's trending topics in the world:
"#;

const INSTRUCTION_TAIL: &str = r#"
Please select a topic from this list to base the prompt on. The topic should not be about a company or sports club. The prompt should be short and concise.
The prompt should create a piece of art that is visually striking and attention-grabbing. The style should be a little abstract and futuristic.
The prompt should mention that the piece of art should be a painting or a drawing.
Also provide a title for the piece of art.
Format your response as follows:
Prompt: [Your generated prompt]
Title: [Your generated title]"#;

/// A prompt for the image backend and the title stamped on the result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtPrompt {
    /// Text sent to the image backend
    pub prompt: String,
    /// Title overlaid on the image
    pub title: String,
}

impl ArtPrompt {
    /// The pair used whenever the model gives us nothing.
    pub fn fallback() -> Self {
        Self {
            prompt: FALLBACK_PROMPT.to_string(),
            title: FALLBACK_TITLE.to_string(),
        }
    }
}

/// Failures from invoking the model runner.
#[derive(Debug)]
pub enum RunnerError {
    /// The runner binary could not be located
    NotFound(String),
    /// The runner ran and exited unsuccessfully
    Failed {
        /// Exit status rendered for display
        status: String,
        /// Captured standard error
        stderr: String,
    },
    /// Any other spawn or pipe failure
    Io(std::io::Error),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(command) => write!(f, "{command} not found"),
            Self::Failed { status, .. } => write!(f, "runner exited with {status}"),
            Self::Io(err) => write!(f, "failed to run model: {err}"),
        }
    }
}

impl std::error::Error for RunnerError {}

impl RunnerError {
    /// Only a missing binary is worth waiting for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn from_exit(status: ExitStatus, stderr: &[u8]) -> Self {
        Self::Failed {
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

/// Something that sends text to a language model and returns its reply.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Runs the model once with `instruction` and returns its full output.
    async fn run(&self, instruction: &str) -> Result<String, RunnerError>;
}

/// Runs `ollama run <model> <instruction>` and captures standard output.
#[derive(Clone, Debug)]
pub struct OllamaRunner {
    command: String,
    model: String,
}

impl Default for OllamaRunner {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_COMMAND, DEFAULT_OLLAMA_MODEL)
    }
}

impl OllamaRunner {
    /// Runner for a given binary and model name.
    pub fn new(command: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelRunner for OllamaRunner {
    async fn run(&self, instruction: &str) -> Result<String, RunnerError> {
        debug!("Invoking {} run {}", self.command, self.model);
        let output = Command::new(&self.command)
            .arg("run")
            .arg(&self.model)
            .arg(instruction)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    RunnerError::NotFound(self.command.clone())
                } else {
                    RunnerError::Io(err)
                }
            })?;

        if !output.status.success() {
            return Err(RunnerError::from_exit(output.status, &output.stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builds the model instruction with the topics listed one per line.
pub fn build_instruction(topics: &[String]) -> String {
    let mut instruction = String::from(INSTRUCTION_HEAD);
    for topic in topics {
        let _ = writeln!(instruction, "- {topic}");
    }
    instruction.push_str(INSTRUCTION_TAIL);
    instruction
}

/// Extracts the first `Prompt: ` and `Title: ` lines; a missing line yields "".
pub fn parse_response(response: &str) -> ArtPrompt {
    let field = |marker: &str| {
        response
            .trim()
            .lines()
            .find_map(|line| line.strip_prefix(marker))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };

    ArtPrompt {
        prompt: field(PROMPT_MARKER),
        title: field(TITLE_MARKER),
    }
}

/// Asks a [`ModelRunner`] for a prompt, degrading to [`ArtPrompt::fallback`].
pub struct PromptSynthesizer {
    runner: Box<dyn ModelRunner>,
    retry: RetryPolicy,
}

impl PromptSynthesizer {
    /// Synthesizer over any runner and retry policy.
    pub fn new(runner: Box<dyn ModelRunner>, retry: RetryPolicy) -> Self {
        Self { runner, retry }
    }

    /// Raw model output, or `None` when the runner never produced any.
    pub async fn invoke(&self, instruction: &str) -> Option<String> {
        let result = self
            .retry
            .run(RunnerError::is_retryable, || self.runner.run(instruction))
            .await;

        match result {
            Ok(output) => Some(output),
            Err(RunnerError::Failed { status, stderr }) => {
                error!("Error running model: exited with {status}");
                error!("stderr: {stderr}");
                None
            }
            Err(err) if err.is_retryable() => {
                error!(
                    "Failed to run model after {} attempts: {err}",
                    self.retry.max_attempts.max(1)
                );
                None
            }
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }

    /// Produces the prompt/title pair for `topics`. Never fails.
    pub async fn synthesize(&self, topics: &[String]) -> ArtPrompt {
        let instruction = build_instruction(topics);
        match self.invoke(&instruction).await {
            Some(response) if !response.is_empty() => {
                let parsed = parse_response(&response);
                if parsed.prompt.is_empty() || parsed.title.is_empty() {
                    warn!("Model reply was missing a Prompt or Title line");
                }
                info!("Model suggested \"{}\"", parsed.title);
                parsed
            }
            _ => {
                warn!("Using the fallback prompt");
                ArtPrompt::fallback()
            }
        }
    }
}
