use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use rental_dashboard::adapters::cache::memory_cache::MemoryCache;
use rental_dashboard::adapters::files::FileListingSource;
use rental_dashboard::config::load_config;
use rental_dashboard::mcp::server::DashboardMcpServer;
use rental_dashboard::ports::cache::ProjectionCache;
use rental_dashboard::repository::ListingRepository;

fn find_config_path() -> PathBuf {
    let candidates = [
        PathBuf::from("config.yaml"),
        binary_dir().join("config.yaml"),
    ];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn binary_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting rental-dashboard server");

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let source = FileListingSource::new(&config.data.dataset_dir);
    let repository = ListingRepository::load(&source, &config.data.cities).await?;
    tracing::info!(
        cities = repository.city_names().count(),
        months = repository.date_axis().len(),
        "Repository loaded"
    );

    let cache: Arc<dyn ProjectionCache> = Arc::new(MemoryCache::new(config.cache.max_entries));
    let server = DashboardMcpServer::new(Arc::new(repository), Arc::new(config), cache);

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
