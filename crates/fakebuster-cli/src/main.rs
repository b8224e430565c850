mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fakebuster-cli")]
#[command(about = "FakeBuster scoring engine command line interface")]
struct Cli {
    /// Model artifact to load instead of `FAKEBUSTER_MODEL_PATH`
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Skip sentiment features even if enabled in config
    #[arg(long, global = true)]
    no_sentiment: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the feature vector and named features for a review (`-` reads stdin)
    Features { text: String },
    /// Classify one review as fake or genuine (`-` reads stdin)
    Classify { text: String },
    /// Scan free text for scam phrasing (`-` reads stdin)
    Scan { text: String },
    /// Score website legitimacy from a JSON file of page signals
    Trust { signals: PathBuf },
    /// Classify a JSON array of reviews and print the batch summary
    Batch {
        reviews: PathBuf,

        /// Override `FAKEBUSTER_MAX_BATCH_SIZE`
        #[arg(long, value_parser = parse_batch_size)]
        max_batch_size: Option<usize>,
    },
    /// Show which classifier variant is active
    ModelInfo,
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = fakebuster_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = commands::Settings {
        model_path: cli.model.unwrap_or_else(|| config.model_path.clone()),
        sentiment_enabled: config.sentiment_enabled && !cli.no_sentiment,
        max_batch_size: config.max_batch_size,
    };

    let output = match cli.command {
        Some(Commands::Features { text }) => {
            commands::features(&settings, &commands::read_text(&text)?)?
        }
        Some(Commands::Classify { text }) => {
            commands::classify(&settings, &commands::read_text(&text)?)?
        }
        Some(Commands::Scan { text }) => commands::scan(&commands::read_text(&text)?)?,
        Some(Commands::Trust { signals }) => commands::trust(&signals)?,
        Some(Commands::Batch {
            reviews,
            max_batch_size,
        }) => commands::batch(&settings, &reviews, max_batch_size)?,
        Some(Commands::ModelInfo) => commands::model_info(&settings)?,
        None => {
            println!("fakebuster-cli ready; run with --help to list commands");
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}
