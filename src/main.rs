use anyhow::{Context, Result};
use clap::Parser;
use pkgname::{
    api::{self, StaticFiles},
    assets::AssetStore,
    config, filters, logging, server, sources,
    store::{NameStore, StoreConfig},
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pkgname", about = "Generate and judge package names over HTTP")]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// Read static files from disk at each request.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::init_config().context("failed to load configuration")?;
    config.server_port = cli.port.or(config.server_port);
    config.dev_mode |= cli.dev;
    logging::init_tracing(config.log_file.as_deref());
    tracing::debug!(
        sources = ?config.sources,
        history_capacity = config.history_capacity,
        max_dist = config.max_dist,
        language = %config.language.name,
        server_port = ?config.server_port,
        dev_mode = config.dev_mode,
        "Loaded configuration"
    );

    let candidates = sources::load_names(&config.sources).context("failed to load name sources")?;
    let store = NameStore::new(StoreConfig {
        candidates,
        filters: filters::standard_filters(&config.language),
        history_capacity: config.history_capacity,
        max_dist: config.max_dist,
    })
    .context("failed to build the name store")?;
    tracing::info!(
        names = store.corpus().len(),
        filters = ?store.filter_names(),
        "Name store ready"
    );

    let static_files = if config.dev_mode {
        StaticFiles::Disk(config.static_dir.clone())
    } else {
        let assets = AssetStore::load(&config.static_dir)
            .context("failed to prepare static assets")?;
        StaticFiles::Preloaded(Arc::new(assets))
    };
    let app = api::create_router(Arc::new(store), config.history_window, static_files);

    let listener = server::bind_listener(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app)
        .await
        .context("failed to listen and serve")?;
    Ok(())
}
