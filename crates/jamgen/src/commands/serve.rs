//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

use jamgen_data::SiteConfig;

/// Run the serve command.
pub async fn run(root: &Path, port: u16, dir: Option<PathBuf>, open_browser: bool) -> Result<()> {
    let site = SiteConfig::load(root)?;
    let dir = dir.unwrap_or_else(|| site.project_paths(root).output_dir);

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'jamgen build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if open_browser {
        let url = format!("http://{}", addr);
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
