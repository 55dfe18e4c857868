use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flashnews::app::AppContext;
use flashnews::cli::{commands, Cli, Commands};
use flashnews::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Headlines { refresh, country } => {
            commands::show_headlines(&ctx, refresh, country.as_deref()).await?;
        }
        Commands::Watch { country, every } => {
            commands::watch_headlines(&ctx, country.as_deref(), &every).await?;
        }
        Commands::Show { url, open } => {
            commands::show_article(&ctx, &url, open).await?;
        }
        Commands::Search { query } => {
            commands::search(&ctx, &query).await?;
        }
        Commands::Prune { older_than } => {
            commands::prune(&ctx, &older_than)?;
        }
        Commands::Clear => {
            commands::clear(&ctx)?;
        }
    }

    Ok(())
}
