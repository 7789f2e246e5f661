use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pasito_sync::app::AppContext;
use pasito_sync::cli::{commands, Cli};
use pasito_sync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pasito_sync=debug" } else { "pasito_sync=info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let ctx = AppContext::new(config, cli.flags()).await?;
    let result = commands::sync(&ctx, &cli).await;
    ctx.shutdown().await;

    result?;
    Ok(())
}
