//! `sheetsite serve` command implementation.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sheetsite::{SiteState, router};
use tokio::signal;
use tracing::info;

use super::ConfigArgs;

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to listen on.
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub addr: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,
}

pub async fn run(args: &ServeArgs) -> Result<()> {
    let shutdown = async {
        let _ = signal::ctrl_c().await;
        info!("Received shutdown signal");
    };
    run_with_shutdown(args, shutdown).await
}

async fn run_with_shutdown<F>(args: &ServeArgs, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let config = args.config.load()?;

    println!("{} Starting {}...", style("→").cyan(), config.site_title);

    let spreadsheet_id = config.spreadsheet_id.clone();
    let state = SiteState::new(config).context("failed to load views")?;

    let addr = SocketAddr::new(args.addr, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind site server on {addr}"))?;
    let addr = listener.local_addr().context("failed to read bound address")?;

    info!(address = %addr, spreadsheet_id = %spreadsheet_id, "Starting site server");

    println!(
        "{} Site running on http://{}",
        style("✓").green().bold(),
        addr
    );
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("Site server stopped");
    Ok(())
}
