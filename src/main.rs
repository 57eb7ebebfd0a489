use axum::Router;
use std::sync::Arc;
use time::UtcOffset;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dogfeed::app::photos::PhotoService;
use dogfeed::app::relay::RelayService;
use dogfeed::config::{AppConfig, AppMode};
use dogfeed::http::{self, Pages};
use dogfeed::infra::{self, storage::ObjectStorage, table::PhotoTable};
use dogfeed::{AppState, RelayState};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The local offset can only be read while the process is single-threaded.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(local_offset))
}

async fn run(local_offset: UtcOffset) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!(mode = ?config.app_mode, "started new task");

    let app: Router = match config.app_mode {
        AppMode::Frontend => {
            let sdk_config = infra::load_sdk_config(&config).await;
            let storage = ObjectStorage::new(&sdk_config, &config);
            let table = PhotoTable::new(&sdk_config, &config);
            tracing::info!(
                bucket = storage.bucket(),
                table = table.table_name(),
                "configured stores"
            );

            let state = AppState {
                photos: PhotoService::new(Arc::new(storage), Arc::new(table)),
                pages: Pages::new()?,
                stylesheet_url: config.stylesheet_url(),
                local_offset,
                upload_max_bytes: config.upload_max_bytes,
            };
            http::router(state)
        }
        AppMode::Webhook => {
            let relay = RelayService::new(config.webhook_url.clone(), config.site_url.clone())?;
            http::relay_router(RelayState { relay })
        }
    };

    let app = app.layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
