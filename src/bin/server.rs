//! Sick-leave engine API server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sick-leave-server
//!
//! SICK_LEAVE_PORT=9090 SICK_LEAVE_SALARIES_FILE=./salaries.yaml cargo run --bin sick-leave-server
//! ```
//!
//! # Environment Variables
//!
//! * `SICK_LEAVE_HOST` - Server host (default: 0.0.0.0)
//! * `SICK_LEAVE_PORT` - Server port (default: 8080)
//! * `SICK_LEAVE_POLICY_DIR` - Policy configuration directory (default: ./config/co_sick_leave)
//! * `SICK_LEAVE_SALARIES_FILE` - Optional YAML list of salary entries
//! * `SICK_LEAVE_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)

use std::net::SocketAddr;

use serde::Deserialize;
use sick_leave_engine::api::{create_router, AppState};
use sick_leave_engine::config::ConfigLoader;
use sick_leave_engine::lifecycle::SickLeaveEngine;
use sick_leave_engine::storage::{InMemoryRepository, InMemorySalaryDirectory};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Server settings read from `SICK_LEAVE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
struct ServerSettings {
    host: String,
    port: u16,
    policy_dir: String,
    salaries_file: Option<String>,
    log_level: String,
}

impl ServerSettings {
    fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("policy_dir", "./config/co_sick_leave")?
            .set_default("log_level", "info")?
            .add_source(config::Environment::with_prefix("SICK_LEAVE"))
            .build()?
            .try_deserialize()
    }

    fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let settings = ServerSettings::from_env()?;
    init_tracing(&settings.log_level);

    let config = ConfigLoader::load(&settings.policy_dir)?;
    tracing::info!(
        policy = %config.policy().code,
        version = %config.policy().version,
        schedules = config.config().schedules().len(),
        "Loaded policy configuration"
    );

    let salaries = match &settings.salaries_file {
        Some(path) => InMemorySalaryDirectory::from_yaml_file(path)?,
        None => {
            tracing::warn!("No salaries file configured; monetary figures will be unvalued");
            InMemorySalaryDirectory::new()
        }
    };

    let engine = SickLeaveEngine::new(InMemoryRepository::new(), salaries, config);
    let app = create_router(AppState::new(engine));

    let addr: SocketAddr = settings.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
