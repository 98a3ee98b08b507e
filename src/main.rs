use anyhow::Result;
use clap::Parser;
use reelroom::config::Config;
use reelroom::server;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "reelroom",
    version,
    about = "Self-hosted video and blog catalog with an admin upload pipeline"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the listen port from config.
    #[arg(long)]
    port: Option<u16>,
    /// Override the data directory from config.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        let host = config
            .listen_addr
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listen_addr = format!("{host}:{port}");
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    server::serve(config).await
}
