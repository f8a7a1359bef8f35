//! Grimoire - book catalogue REST API server binary.

use grimoire::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    grimoire::start_server(config).await?;

    Ok(())
}
