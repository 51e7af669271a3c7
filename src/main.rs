use anyhow::Result;
use clap::Parser;
use trendart::config::{PipelineConfig, setup_logging};
use trendart::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = trendart::cli::CliOptions::parse();

    let _ = setup_logging(cli.debug);

    let config = PipelineConfig::from(cli);
    let pipeline = Pipeline::from_config(config)?;
    pipeline.run().await?;
    Ok(())
}
