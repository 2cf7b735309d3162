//! CLI for running one competitor analysis
//!
//! Prints the finished result as pretty JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use competitor_scout::AnalysisRequest;
use scout_server::{kernel::build_scout, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Discover competitors for a product domain or feature set")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full discovery pipeline once
    Analyze {
        /// Market or domain, e.g. "在线教育"
        #[arg(long)]
        domain: Option<String>,

        /// Feature description of your product
        #[arg(long)]
        features: Option<String>,

        /// Your product's name
        #[arg(long, default_value = "")]
        product: String,

        /// Skip the per-competitor feature search
        #[arg(long)]
        no_enrich: bool,

        /// Skip the market insights call
        #[arg(long)]
        no_summary: bool,

        /// Relevance threshold (1-10)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        min_score: Option<u8>,

        /// Override the LLM model
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,competitor_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            domain,
            features,
            product,
            no_enrich,
            no_summary,
            min_score,
            model,
        } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let mut scout = build_scout(&config)?;

            let pipeline = scout.config_mut();
            pipeline.enrich = !no_enrich;
            pipeline.summarize = !no_summary;
            if let Some(min_score) = min_score {
                pipeline.min_score = min_score;
            }
            if let Some(model) = model {
                pipeline.model = model;
            }

            let request = AnalysisRequest {
                domain,
                features,
                product_name: product,
            };
            let result = scout.run(&request).await.context("Analysis failed")?;

            eprintln!("{}", result.message());
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("Failed to serialize result")?
            );
        }
    }

    Ok(())
}
