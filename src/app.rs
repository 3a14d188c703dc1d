/*
 * Responsibility
 * - Config読み込み → 依存生成 (datasource + migration) → Router 組み立て
 * - Middleware の適用
 * - axum::serve() で起動、シグナルで graceful shutdown
 */
use std::panic;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{AppEnv, Config},
    middleware,
    repos::{Datasource, PgDatasource},
    state::AppState,
};

fn init_tracing(app_env: AppEnv) {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,hello_web=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if app_env.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    // Loaded first so .env files can also supply RUST_LOG.
    let config = Config::from_env()?;

    init_tracing(config.app_env);
    init_panic_hook();

    tracing::info!(
        "starting in {:?} mode ({} environment) on {}",
        config.app_env,
        config.server_env,
        config.addr()
    );
    tracing::info!("loaded configuration:\n{}", config.describe());

    let datasource =
        PgDatasource::connect(config.connect_options()?, config.db_max_connections).await?;
    datasource.migrate(&config.migrations_dir).await?;

    let state = AppState::new(datasource.clone(), config.health_check_timeout);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    datasource.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

pub fn build_router<D: Datasource>(state: AppState<D>) -> Router {
    let router = Router::new().merge(api::routes()).with_state(state);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
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
