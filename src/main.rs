use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use workout_planner::config::{run_migrations, AppConfig, DatabaseConfig, StorageBackend};
use workout_planner::store::{InMemoryWorkoutStore, PgWorkoutStore, WorkoutStore};
use workout_planner::{create_routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store: Arc<dyn WorkoutStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = db_config.create_pool().await?;
            if db_config.run_migrations {
                run_migrations(&pool).await?;
                info!("Database migrations applied");
            }
            Arc::new(PgWorkoutStore::new(pool))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("In-memory storage selected in production; data is lost on restart");
            }
            Arc::new(InMemoryWorkoutStore::new())
        }
    };

    if config.plan_cache_ttl.is_zero() {
        info!("Plan cache disabled");
    }

    let state = AppState::new(store, &config.jwt_secret, config.plan_cache_ttl);
    let app = create_routes(state);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!(
        "Workout planner starting on http://{} ({} storage, {} environment)",
        address,
        config.storage_backend.as_str(),
        config.environment
    );
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Workout planner stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
