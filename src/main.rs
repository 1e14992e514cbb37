//! Main entry point for the Simplify Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use simplify_translator::cli::commands::{self, Commands};
use simplify_translator::core::config::AppConfig;

/// Simplify Translator - text simplification, translation and document conversion
#[derive(Parser, Debug)]
#[command(name = "simplify-translator", version, about, long_about = None)]
struct Args {
    /// OpenAI API key (optional, defaults to APP__OPENAI__API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("simplify_translator={},tower_http={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    match args.command {
        Some(Commands::Server { host, port }) => {
            let mut config = AppConfig::load()?;
            if let Some(api_key) = args.api_key {
                config.openai.api_key = api_key;
            }
            commands::handle_server(config, host, port).await?;
        }
        Some(Commands::Import { file, output }) => {
            commands::handle_import(file, output).await?;
        }
        Some(Commands::Export {
            text,
            metrics_original,
            metrics_simplified,
            format,
            output,
        }) => {
            commands::handle_export(text, metrics_original, metrics_simplified, format, output)
                .await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
