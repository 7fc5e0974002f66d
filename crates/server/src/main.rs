mod api;
mod config;
mod range;
mod state;
mod streaming;
mod utils;

use std::sync::Arc;

use api::app_router;
use config::{config_path_from_env, load_or_create_config, resolve_path};
use library::Library;
use parking_lot::RwLock;
use state::AppState;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let music_root = resolve_path(&config_path, &config.music_root);
    if !music_root.is_dir() {
        warn!(
            "Music directory {} does not exist; the library will be empty until it is set",
            music_root.display()
        );
    }

    let bind_addr = config.listen_addr();
    let scan_on_startup = config.scan_on_startup;
    let state = AppState {
        library: Arc::new(Library::new(music_root)),
        config_path,
        config: Arc::new(RwLock::new(config)),
    };

    if scan_on_startup {
        let library = Arc::clone(&state.library);
        tokio::task::spawn_blocking(move || {
            let stats = library.stats();
            info!(
                "Library ready: {} artists, {} albums, {} tracks",
                stats.artists, stats.albums, stats.tracks
            );
        });
    }

    let app = app_router(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", err);
        }
    }

    info!("Shutdown signal received.");
}
