use crate::collector::Collector;
use crate::config::Config;
use crate::runner::ProcessRunner;
use crate::state::AppState;
use crate::web::create_router;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    /// Create a new App instance from loaded configuration
    pub fn new(config: Config) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.command_timeout));
        let collector = Collector::new(runner, config.tools(), config.device_order);
        let state = AppState::new(collector, config.get_hostname());

        Self { config, state }
    }

    /// Run the application: start Axum and handle graceful shutdown signals
    pub async fn run(self) -> ExitCode {
        use crate::signals::drain_on_shutdown;

        let started = Instant::now();
        let router = create_router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));

        info!(
            address = %addr,
            hostname = %self.state.hostname,
            command_timeout = format!("{:.2?}", self.config.command_timeout),
            device_order = ?self.config.device_order,
            "starting axum web server"
        );

        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(drain_on_shutdown(started))
                    .await
                {
                    error!(error = ?error, "axum server error");
                    ExitCode::FAILURE
                } else {
                    info!("axum server stopped");
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                error!(error = ?error, "failed to bind TCP listener");
                ExitCode::FAILURE
            }
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
