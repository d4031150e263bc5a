use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driftboard::app::posts::PostService;
use driftboard::config::AppConfig;
use driftboard::infra::clock::{Clock, SystemClock};
use driftboard::infra::db::Db;
use driftboard::jobs::{cleanup, scheduler::PeriodicTask};
use driftboard::{http, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = Db::connect(&config).await?;
    db.migrate().await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState {
        db: db.clone(),
        clock: clock.clone(),
        retention: config.retention,
    };

    let posts = PostService::new(db.clone(), clock.clone(), config.retention);
    let mut cleanup_task = PeriodicTask::new(
        "post-cleanup",
        Duration::from_secs(config.cleanup_interval_seconds),
        move || {
            let (posts, clock) = (posts.clone(), clock.clone());
            async move { cleanup::sweep(&posts, clock.as_ref()).await.map(|_| ()) }
        },
    )
    .run_on_startup(config.cleanup_run_on_startup);
    cleanup_task.start();

    let app: Router = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(
        retention_days = config.retention.window_days(),
        "listening on {}",
        config.http_addr
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup_task.stop().await;
    db.close().await;

    served?;
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
