use anyhow::{Context, Result};
use axum::serve;
use calendar::core::config::Config;
use calendar::core::startup::bootstrap_admin;
use calendar::core::state::AppState;
use calendar::stores::database::Database;
use calendar::stores::session_store::SessionStore;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first time running the calendar, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    calendar::core::tracing_init::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = config.server.port,
        num_threads = config.server.num_threads,
        database = %config.database.path.display(),
        anon_permission = %config.permissions.anon_permission,
        default_locale = %config.locale.default,
        "Calendar starting"
    );

    let db = Database::open(&config.database.path)
        .context(format!("Failed to open database at {}", config.database.path.display()))?;

    info!(path = %config.database.path.display(), "Database ready");

    if let Some(uid) = bootstrap_admin(&db, config.bootstrap.as_ref())? {
        info!(uid = uid, "First administrator created from bootstrap config");
    }

    let state = Arc::new(AppState::new(config.clone(), db));

    spawn_session_sweep(
        Arc::clone(&state.sessions),
        config.session.sweep_interval,
        config.session.idle_timeout,
    );

    info!(
        sweep_interval_seconds = config.session.sweep_interval,
        idle_timeout_seconds = config.session.idle_timeout,
        "Session sweep task started"
    );

    let app = calendar::core::routes::build_router(Arc::clone(&state))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                )
        );

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&addr).await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "Calendar listening");

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state.sessions)))
        .await
        .context("HTTP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Spawn a background task that periodically drops idle sessions
fn spawn_session_sweep(sessions: Arc<SessionStore>, sweep_interval: u64, idle_timeout: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval));

        loop {
            interval.tick().await;

            let removed = sessions.purge_idle(Duration::from_secs(idle_timeout));

            if removed > 0 {
                info!(
                    removed_sessions = removed,
                    active_sessions = sessions.len(),
                    "Idle session sweep completed"
                );
            } else {
                debug!("Idle session sweep completed, nothing to drop");
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(sessions: Arc<SessionStore>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!(
        active_sessions = sessions.len(),
        "Shutdown signal received, in-memory sessions will be dropped"
    );
}
